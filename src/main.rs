//! CLI for Publine
//!
//! Subcommands:
//! - `server`: run the broker
//! - `client <host> <port> publish <topic> <message>`: publish one message
//! - `client <host> <port> subscribe <topic>...`: print messages from topics

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use publine::broker::Broker;
use publine::client::{Subscription, publish};
use publine::config::{Settings, load_config};
use publine::transport::tcp::start_server;
use publine::utils::{error::ClientError, logging};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "publine", version, about = "Minimal TCP publish/subscribe broker")]
enum Command {
    /// Start the broker
    Server {
        /// Host to bind to (overrides configuration)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides configuration)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Talk to a running broker
    Client {
        /// Server host
        host: String,
        /// Server port
        port: u16,
        #[command(subcommand)]
        action: ClientAction,
    },
}

#[derive(Subcommand)]
enum ClientAction {
    /// Publish a message
    Publish {
        /// Topic to publish to
        topic: String,
        /// Message to publish
        message: String,
    },
    /// Subscribe to topics and print incoming messages
    Subscribe {
        /// Topics to subscribe to
        #[arg(required = true)]
        topics: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cmd = Command::parse();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&settings.logging.level);

    match cmd {
        Command::Server { host, port } => {
            let mut settings = settings;
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            run_server(settings).await
        }
        Command::Client { host, port, action } => {
            let addr = format!("{host}:{port}");
            match run_client(&addr, action, &settings).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn run_server(settings: Settings) -> ExitCode {
    let broker = Arc::new(Broker::new());

    tokio::select! {
        res = start_server(&settings, broker) => match res {
            Ok(()) => {
                error!("Broker exited unexpectedly.");
                ExitCode::FAILURE
            }
            Err(e) => {
                error!("Server failed: {e}");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down server...");
            ExitCode::SUCCESS
        }
    }
}

async fn run_client(
    addr: &str,
    action: ClientAction,
    settings: &Settings,
) -> Result<(), ClientError> {
    let timeout = settings.client.ack_timeout();

    match action {
        ClientAction::Publish { topic, message } => {
            publish(addr, &topic, &message, timeout).await?;
            println!("Message published to topic '{topic}'");
        }
        ClientAction::Subscribe { topics } => {
            let mut subscription = Subscription::connect(addr, &topics, timeout).await?;
            for topic in subscription.topics() {
                println!("Subscribed to topic '{topic}'");
            }
            println!("Waiting for messages... (Ctrl+C to exit)");

            loop {
                tokio::select! {
                    next = subscription.next_delivery() => match next? {
                        Some(delivery) => println!("[{}] {}", delivery.topic, delivery.message),
                        None => {
                            println!("Server disconnected");
                            break;
                        }
                    },
                    _ = tokio::signal::ctrl_c() => {
                        println!("\nDisconnecting...");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
