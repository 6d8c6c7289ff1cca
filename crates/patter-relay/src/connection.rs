//! Per-connection handler: attach to a session, queue utterances for a
//! sequential worker, and forward its responses.
//!
//! The reader turns frames into queued utterances for the worker, which
//! runs one relay cycle each. A separate writer task owns the socket sink
//! and drains the outbox no matter what the reader is waiting on, so a
//! client that pipelines frames is only ever held back by its own reads.
//!
//! The worker is detached from the socket: a client disconnecting during
//! generation does not cancel the cycle, it still completes and persists,
//! and only the reply is dropped.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use patter_common::new_correlation_id;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::dispatcher::Dispatcher;
use crate::protocol::{RelayResponse, EMPTY_MESSAGE};
use crate::session::SessionStore;

/// Utterances received but not yet relayed, per connection.
const INBOX_CAPACITY: usize = 32;

/// Frames waiting for the socket, per connection.
const OUTBOX_CAPACITY: usize = 32;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Handle a single WebSocket connection.
///
/// Returns once the client is gone (or the server is closing) and the
/// worker has finished every cycle it started.
pub async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    sessions: SessionStore,
) {
    let conn = new_correlation_id();
    let (sink, mut stream) = ws.split();

    let dispatcher = sessions.attach().await;
    let session_id = dispatcher.session_id().clone();
    let attached = sessions.connections(&session_id).await;

    tracing::info!(
        peer = %addr,
        conn = %conn,
        session = %session_id,
        attached,
        "Client connected"
    );

    let (outbox_tx, outbox_rx) = mpsc::channel::<Message>(OUTBOX_CAPACITY);
    let (inbox_tx, inbox_rx) = mpsc::channel::<String>(INBOX_CAPACITY);
    let writer = tokio::spawn(run_writer(sink, outbox_rx, conn.clone()));
    let worker = tokio::spawn(run_worker(
        dispatcher,
        inbox_rx,
        outbox_tx.clone(),
        sessions.closing(),
        conn.clone(),
    ));

    let mut closing = sessions.closing();
    let ready = RelayResponse::SessionReady {
        session_id: session_id.to_string(),
    };

    if outbox_tx.send(text_frame(&ready)).await.is_ok() {
        loop {
            tokio::select! {
                _ = closing.changed() => {
                    tracing::info!(conn = %conn, "Server closing; no further utterances");
                    break;
                }

                // Frames from the client → worker queue
                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            let queued = if text.trim().is_empty() {
                                let err = RelayResponse::error(EMPTY_MESSAGE, "message is empty");
                                outbox_tx.send(text_frame(&err)).await.is_ok()
                            } else {
                                inbox_tx.send(text.to_string()).await.is_ok()
                            };
                            if !queued {
                                break;
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if outbox_tx.send(Message::Pong(data)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            tracing::debug!(peer = %addr, error = %e, "WS error");
                            break;
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    tracing::info!(
        peer = %addr,
        conn = %conn,
        session = %session_id,
        "Client disconnected"
    );

    // Closing the inbox lets the worker finish what it has; the writer ends
    // once the worker drops the last outbox sender.
    drop(inbox_tx);
    drop(outbox_tx);
    if let Err(e) = worker.await {
        tracing::error!(conn = %conn, error = %e, "Relay worker panicked");
    }
    sessions.detach(&session_id).await;
    let _ = writer.await;
}

/// Relay queued utterances one at a time, in arrival order.
///
/// Once the server is closing, utterances that have not started are
/// dropped unanswered; nothing is persisted for them.
async fn run_worker(
    dispatcher: Arc<Dispatcher>,
    mut inbox: mpsc::Receiver<String>,
    outbox: mpsc::Sender<Message>,
    closing: watch::Receiver<bool>,
    conn: String,
) {
    while let Some(text) = inbox.recv().await {
        let shutting_down = *closing.borrow();
        if shutting_down {
            tracing::debug!(conn = %conn, "Server closing; queued utterance dropped");
            break;
        }
        let response = match dispatcher.handle(&text).await {
            Ok(content) => RelayResponse::Reply { content },
            Err(e) => RelayResponse::error(e.reason(), e.to_string()),
        };
        if outbox.send(text_frame(&response)).await.is_err() {
            tracing::debug!(conn = %conn, "Client gone; response dropped");
        }
    }
}

/// Own the socket sink: send queued frames in order, then close.
async fn run_writer(mut sink: WsSink, mut outbox: mpsc::Receiver<Message>, conn: String) {
    while let Some(frame) = outbox.recv().await {
        if let Err(e) = sink.send(frame).await {
            tracing::debug!(conn = %conn, error = %e, "WS send failed");
            return;
        }
    }
    let _ = sink.close().await;
}

/// A RelayResponse as a JSON text frame.
fn text_frame(response: &RelayResponse) -> Message {
    Message::Text(response.to_json().into())
}
