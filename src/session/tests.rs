use super::Session;
use crate::transport::message::Message;
use crate::utils::error::SessionError;
use tokio::sync::mpsc;

#[test]
fn test_session_new() {
    let (tx, _) = mpsc::unbounded_channel::<Message>();
    let session = Session::new(tx);
    assert!(session.id.starts_with("client-"));
    assert!(session.peer.is_none());
    assert!(!session.is_closed());
}

#[test]
fn test_session_ids_are_unique() {
    let (tx, _) = mpsc::unbounded_channel::<Message>();
    let a = Session::new(tx.clone());
    let b = Session::new(tx);
    assert_ne!(a.id, b.id);
}

#[test]
fn test_session_send_queues_in_order() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let session = Session::new(tx);

    session.send(Message::Puback).unwrap();
    session.send(Message::Pong).unwrap();

    assert_eq!(rx.try_recv().unwrap(), Message::Puback);
    assert_eq!(rx.try_recv().unwrap(), Message::Pong);
}

#[test]
fn test_session_send_after_close_fails() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let session = Session::new(tx);
    session.close();

    let err = session.send(Message::Ping).unwrap_err();
    assert_eq!(err, SessionError::Closed(session.id.clone()));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_session_send_with_dropped_writer_fails() {
    let (tx, rx) = mpsc::unbounded_channel::<Message>();
    let session = Session::new(tx);
    drop(rx);

    assert!(session.send(Message::Ping).is_err());
}

#[test]
fn test_session_close_is_idempotent() {
    let (tx, _) = mpsc::unbounded_channel::<Message>();
    let session = Session::new(tx);
    session.close();
    session.close();
    assert!(session.is_closed());
}

#[tokio::test]
async fn test_session_closed_resolves_after_close() {
    let (tx, _) = mpsc::unbounded_channel::<Message>();
    let session = std::sync::Arc::new(Session::new(tx));

    let waiter = {
        let session = session.clone();
        tokio::spawn(async move { session.closed().await })
    };

    session.close();
    tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
        .await
        .expect("closed() did not resolve")
        .unwrap();
}

#[test]
fn test_session_with_peer_records_address() {
    let (tx, _) = mpsc::unbounded_channel::<Message>();
    let peer: std::net::SocketAddr = "127.0.0.1:4000".parse().unwrap();
    let session = Session::with_peer(tx, peer);
    assert_eq!(session.peer, Some(peer));
    assert!(session.id.starts_with("client-"));
}
