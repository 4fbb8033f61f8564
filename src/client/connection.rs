use std::io;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::transport::codec::MessageCodec;
use crate::transport::message::Message;
use crate::utils::error::ClientError;

/// How long to wait for a `puback` or `suback` by default.
pub const ACK_TIMEOUT: Duration = Duration::from_secs(10);

/// A published message received by a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub topic: String,
    pub message: String,
}

/// A client connection to the broker.
#[derive(Debug)]
pub struct Connection {
    framed: Framed<TcpStream, MessageCodec>,
}

impl Connection {
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await.map_err(|e| match e.kind() {
            io::ErrorKind::ConnectionRefused => ClientError::ConnectionRefused(addr.to_string()),
            _ => ClientError::from(e),
        })?;
        Ok(Self {
            framed: Framed::new(stream, MessageCodec::default()),
        })
    }

    pub async fn send(&mut self, msg: Message) -> Result<(), ClientError> {
        self.framed.send(msg).await?;
        Ok(())
    }

    /// Next message from the server, or `None` once it hangs up.
    ///
    /// Pings are answered here and never returned. Lines that fail to decode
    /// are skipped.
    pub async fn recv(&mut self) -> Result<Option<Message>, ClientError> {
        while let Some(frame) = self.framed.next().await {
            match frame? {
                Ok(Message::Ping) => self.send(Message::Pong).await?,
                Ok(msg) => return Ok(Some(msg)),
                Err(e) if e.is_silent() => debug!(error = %e, "ignoring server message"),
                Err(e) => warn!(error = %e, "invalid message from server"),
            }
        }
        Ok(None)
    }

    /// Waits up to `timeout` for the first message accepted by `is_ack`,
    /// discarding anything else that arrives first.
    pub async fn await_ack<F>(
        &mut self,
        timeout: Duration,
        what: &'static str,
        mut is_ack: F,
    ) -> Result<(), ClientError>
    where
        F: FnMut(&Message) -> bool,
    {
        let wait = async {
            loop {
                match self.recv().await? {
                    Some(msg) if is_ack(&msg) => return Ok::<(), ClientError>(()),
                    Some(msg) => debug!(kind = msg.kind(), "skipping while waiting for {what}"),
                    None => return Err(ClientError::Disconnected),
                }
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| ClientError::AckTimeout(timeout, what))?
    }
}

/// Publishes one message and waits for the broker's acknowledgment.
pub async fn publish(
    addr: &str,
    topic: &str,
    message: &str,
    timeout: Duration,
) -> Result<(), ClientError> {
    let mut conn = Connection::connect(addr).await?;
    conn.send(Message::Publish {
        topic: topic.to_string(),
        message: message.to_string(),
    })
    .await?;
    conn.await_ack(timeout, "puback", |m| matches!(m, Message::Puback))
        .await
}

/// A connection subscribed to one or more topics.
#[derive(Debug)]
pub struct Subscription {
    conn: Connection,
    topics: Vec<String>,
}

impl Subscription {
    /// Subscribes to each topic in turn, waiting for its `suback`. The first
    /// failure aborts the remaining subscriptions.
    pub async fn connect(
        addr: &str,
        topics: &[String],
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let mut conn = Connection::connect(addr).await?;
        for topic in topics {
            conn.send(Message::Subscribe {
                topic: topic.clone(),
            })
            .await?;
            conn.await_ack(timeout, "suback", |m| {
                matches!(m, Message::Suback { topic: acked } if acked == topic)
            })
            .await?;
            debug!(topic = %topic, "subscribed");
        }
        Ok(Self {
            conn,
            topics: topics.to_vec(),
        })
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Next delivered message, or `None` when the server disconnects.
    pub async fn next_delivery(&mut self) -> Result<Option<Delivery>, ClientError> {
        loop {
            match self.conn.recv().await? {
                Some(Message::Delivery { topic, message }) => {
                    return Ok(Some(Delivery { topic, message }));
                }
                Some(other) => debug!(kind = other.kind(), "ignoring message"),
                None => return Ok(None),
            }
        }
    }
}
