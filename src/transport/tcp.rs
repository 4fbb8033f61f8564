//! TCP transport
//!
//! Accepts connections and bridges each one to the broker:
//! - the reader side decodes lines and hands messages to `Broker::handle`
//! - the writer side drains the session's outbound queue onto the socket
//! - whichever side finishes first closes the session, which stops the
//!   other, and the broker forgets the session exactly once
//!
//! Shutdown is best effort: dropping the `serve` future stops accepting and
//! leaves in-flight sessions to die with the process.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Semaphore, mpsc};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};

use crate::broker::Broker;
use crate::config::Settings;
use crate::session::Session;
use crate::transport::codec::MessageCodec;
use crate::transport::message::Message;
use crate::utils::error::ServerError;

/// Binds the configured address and serves connections until the returned
/// future is dropped.
pub async fn start_server(settings: &Settings, broker: Arc<Broker>) -> Result<(), ServerError> {
    let addr = settings.server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!("Message broker listening on {addr}");

    if let Some(every) = settings.broker.ping_interval() {
        tokio::spawn(Broker::start_ping_loop(broker.clone(), every));
    }

    serve(
        listener,
        broker,
        settings.broker.max_connections,
        settings.server.max_frame_bytes,
    )
    .await;
    Ok(())
}

/// The accept loop. At most `max_connections` sessions are served at once;
/// further connections wait in the listen backlog.
pub async fn serve(
    listener: TcpListener,
    broker: Arc<Broker>,
    max_connections: usize,
    max_frame_bytes: usize,
) {
    let slots = Arc::new(Semaphore::new(max_connections.max(1)));

    loop {
        let Ok(permit) = slots.clone().acquire_owned().await else {
            error!("connection limiter closed");
            return;
        };

        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };

        info!(%peer, "new connection");
        let broker = broker.clone();
        tokio::spawn(async move {
            handle_connection(stream, peer, broker, max_frame_bytes).await;
            drop(permit);
        });
    }
}

/// Runs one session from accept to teardown.
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    broker: Arc<Broker>,
    max_frame_bytes: usize,
) {
    let (read_half, write_half) = stream.into_split();
    let mut reader = FramedRead::new(read_half, MessageCodec::new(max_frame_bytes));
    let mut writer = FramedWrite::new(write_half, MessageCodec::new(max_frame_bytes));

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let session = Arc::new(Session::with_peer(tx, peer));
    let session_id = session.id.clone();
    broker.register(session.clone());

    let writer_task = {
        let session = session.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => {
                        let Some(msg) = msg else { break };
                        // A peer that stopped reading must not pin the socket open after close.
                        tokio::select! {
                            biased;
                            sent = writer.send(msg) => {
                                if let Err(e) = sent {
                                    debug!(session = %session.id, error = %e, "write failed");
                                    break;
                                }
                            }
                            _ = session.closed() => break,
                        }
                    }
                    _ = session.closed() => break,
                }
            }
            session.close();
        })
    };

    loop {
        tokio::select! {
            frame = reader.next() => match frame {
                Some(Ok(Ok(msg))) => broker.handle(&session, msg),
                Some(Ok(Err(e))) if e.is_silent() => {
                    debug!(session = %session_id, error = %e, "ignoring message");
                }
                Some(Ok(Err(e))) => {
                    warn!(session = %session_id, %peer, error = %e, "invalid message");
                }
                Some(Err(e)) => {
                    debug!(session = %session_id, error = %e, "read failed");
                    break;
                }
                None => break,
            },
            _ = session.closed() => break,
        }
    }

    broker.disconnect(&session_id);
    let _ = writer_task.await;
    info!(session = %session_id, %peer, "client disconnected");
}
