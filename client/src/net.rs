//! Connection lifecycle over the browser WebSocket.
//!
//! A client instance owns exactly one channel. There is no pooling and no
//! automatic reconnection: once the channel closes or errors, the session is
//! over and the protocol phase is abandoned with it.

#[cfg(test)]
#[path = "net_test.rs"]
mod net_test;

#[cfg(target_arch = "wasm32")]
use std::pin::Pin;

#[cfg(target_arch = "wasm32")]
use futures::future::{self, Either};
#[cfg(target_arch = "wasm32")]
use futures::{Sink, SinkExt, StreamExt, pin_mut};
#[cfg(target_arch = "wasm32")]
use gloo_net::websocket::{Message, State, WebSocketError, futures::WebSocket};
#[cfg(target_arch = "wasm32")]
use gloo_timers::future::TimeoutFuture;
#[cfg(target_arch = "wasm32")]
use protocol::Command;

/// Lifecycle of the single channel a client instance owns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No channel has been opened yet.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Frames may flow in both directions.
    Open,
    /// The peer or the client closed the channel. Terminal.
    Closed,
    /// The channel failed. Terminal.
    Errored,
}

impl ConnectionState {
    /// Terminal states never transition again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Errored)
    }
}

/// Channel-level failures.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    /// The channel could not be established.
    #[error("connection failed: {0}")]
    Connect(String),
    /// A send was attempted while the channel was not open.
    #[error("send refused while connection is {0:?}")]
    NotOpen(ConnectionState),
    /// A send failed mid-flight.
    #[error("send failed: {0}")]
    Send(String),
    /// The peer closed the channel.
    #[error("channel closed by the peer")]
    Closed,
    /// The channel reported an error.
    #[error("channel error: {0}")]
    Channel(String),
    /// No reply arrived within the allotted time.
    #[error("timed out waiting for a reply")]
    Timeout,
}

/// The single bidirectional text channel to the generation server.
#[cfg(target_arch = "wasm32")]
pub struct Socket {
    ws: WebSocket,
    state: ConnectionState,
}

#[cfg(target_arch = "wasm32")]
impl Socket {
    /// Begin opening the channel. The socket starts out
    /// [`ConnectionState::Connecting`]; await [`Self::opened`] before
    /// sending.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::Connect`] when the URL is rejected outright.
    pub fn connect(url: &str) -> Result<Self, SocketError> {
        let ws = WebSocket::open(url).map_err(|err| SocketError::Connect(err.to_string()))?;
        Ok(Self { ws, state: ConnectionState::Connecting })
    }

    /// Wait for the handshake to finish.
    ///
    /// Sink readiness doubles as the open signal: `poll_ready` stays pending
    /// until the underlying channel is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError::Connect`] when the handshake fails.
    pub async fn opened(&mut self) -> Result<(), SocketError> {
        let ws = &mut self.ws;
        let ready = future::poll_fn(|cx| Pin::new(&mut *ws).poll_ready(cx)).await;

        match ready {
            // Readiness also resolves when the handshake fails, so confirm
            // the channel really reached the open state.
            Ok(()) if matches!(self.ws.state(), State::Open) => {
                self.state = ConnectionState::Open;
                Ok(())
            }
            Ok(()) => {
                self.state = ConnectionState::Errored;
                Err(SocketError::Connect("channel closed during handshake".to_owned()))
            }
            Err(err) => {
                self.state = ConnectionState::Errored;
                Err(SocketError::Connect(describe(&err)))
            }
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Put one command on the wire. Refuses unless the channel is open.
    ///
    /// # Errors
    ///
    /// [`SocketError::NotOpen`] outside the open state, [`SocketError::Send`]
    /// when the transport rejects the frame.
    pub async fn send(&mut self, command: &Command) -> Result<(), SocketError> {
        if self.state != ConnectionState::Open {
            return Err(SocketError::NotOpen(self.state));
        }

        let sent = self.ws.send(Message::Text(command.encode())).await;
        if let Err(err) = sent {
            self.state = ConnectionState::Errored;
            return Err(SocketError::Send(describe(&err)));
        }
        Ok(())
    }

    /// Wait for the next inbound text frame.
    ///
    /// With `timeout_ms` set the wait is bounded, which is how a stalled
    /// cycle surfaces instead of hanging forever while a reply is
    /// outstanding.
    /// Binary frames are not part of this protocol and are skipped.
    ///
    /// # Errors
    ///
    /// [`SocketError::Timeout`] when the bound elapses, [`SocketError::Closed`]
    /// when the channel ends, [`SocketError::Channel`] on transport errors.
    pub async fn next_text(&mut self, timeout_ms: Option<u32>) -> Result<String, SocketError> {
        loop {
            let message = match timeout_ms {
                Some(ms) => {
                    let recv = self.ws.next();
                    let deadline = TimeoutFuture::new(ms);
                    pin_mut!(recv);
                    pin_mut!(deadline);
                    match future::select(recv, deadline).await {
                        Either::Left((message, _)) => message,
                        Either::Right(((), _)) => return Err(SocketError::Timeout),
                    }
                }
                None => self.ws.next().await,
            };

            match message {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Bytes(_))) => {}
                Some(Err(err)) => {
                    self.state = ConnectionState::Errored;
                    return Err(SocketError::Channel(describe(&err)));
                }
                None => {
                    self.state = ConnectionState::Closed;
                    return Err(SocketError::Closed);
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn describe(err: &WebSocketError) -> String {
    err.to_string()
}
