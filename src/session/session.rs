use std::net::SocketAddr;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use crate::transport::message::Message;
use crate::utils::error::SessionError;

pub type SessionId = String;

/// A connected client as seen by the broker.
///
/// Outbound messages go through `sender`, an unbounded queue drained by a
/// single writer task that owns the socket's write half. Concurrent `send`
/// calls from different publishers therefore never interleave bytes on the
/// wire, and never wait on each other's I/O.
///
/// The queue is unbounded: a client that stops reading makes its backlog
/// grow in broker memory until the connection fails or closes. There is no
/// flow control beyond the socket's own buffers.
#[derive(Debug)]
pub struct Session {
    /// Unique identifier, `client-<uuid>`.
    pub id: SessionId,

    /// Remote address, when the session is backed by a socket.
    pub peer: Option<SocketAddr>,

    sender: UnboundedSender<Message>,
    closed: CancellationToken,
}

impl Session {
    pub fn new(sender: UnboundedSender<Message>) -> Self {
        Self {
            id: format!("client-{}", Uuid::new_v4()),
            peer: None,
            sender,
            closed: CancellationToken::new(),
        }
    }

    pub fn with_peer(sender: UnboundedSender<Message>, peer: SocketAddr) -> Self {
        Self {
            peer: Some(peer),
            ..Self::new(sender)
        }
    }

    /// Queue a message for this session's writer.
    ///
    /// Fails once the session is closed or its writer has gone away; the
    /// caller is expected to tear the session down.
    pub fn send(&self, msg: Message) -> Result<(), SessionError> {
        if self.closed.is_cancelled() {
            return Err(SessionError::Closed(self.id.clone()));
        }
        self.sender
            .send(msg)
            .map_err(|_| SessionError::Closed(self.id.clone()))
    }

    /// Signal the reader and writer tasks to release the transport.
    /// Closing an already closed session does nothing.
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Resolves once `close` has been called.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.closed.cancelled()
    }
}
