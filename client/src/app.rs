//! The session loop: wires socket, decoder, scene store and renderer into
//! one generation cycle from connect to render.
//!
//! Single-threaded and cooperative: all work happens between stream items,
//! frames are processed strictly in arrival order, and the loop is the
//! single sink every decode and sequencing error is reported through. A
//! recoverable error is logged and absorbed; a cycle-fatal one abandons the
//! cycle; only channel and surface failures end the session.

use canvas::render;
use canvas::scene::SceneStore;
use protocol::DecodeError;

use crate::config::ClientConfig;
use crate::decoder::Decoder;
use crate::net::{Socket, SocketError};
use crate::surface;

/// How long a reply may stay outstanding before the cycle is abandoned.
const REPLY_TIMEOUT_MS: u32 = 10_000;

/// Failures that end the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The drawing surface could not be mounted.
    #[error("drawing surface unavailable: {0}")]
    Surface(String),
    /// The channel failed terminally.
    #[error(transparent)]
    Socket(#[from] SocketError),
    /// A render pass failed.
    #[error("render failed: {0}")]
    Render(String),
}

/// Run a session to completion, reporting the outcome through the log sink.
pub async fn run(config: ClientConfig) {
    match run_session(config).await {
        Ok(()) => log::info!("session over: channel closed"),
        Err(err) => log::error!("session failed: {err}"),
    }
}

async fn run_session(config: ClientConfig) -> Result<(), SessionError> {
    let surface = surface::mount(config.width, config.height)
        .map_err(|err| SessionError::Surface(format!("{err:?}")))?;

    let mut socket = Socket::connect(&config.url)?;
    socket.opened().await?;
    log::debug!("connected to {}", config.url);

    let mut store = SceneStore::new();
    let mut decoder = Decoder::new(config.generate_command());

    // The generation request goes out the moment the channel is open.
    let generate = decoder.open(&mut store);
    socket.send(&generate).await?;

    loop {
        // The wait is bounded only while a reply is outstanding.
        let timeout = decoder.phase().awaiting_reply().then_some(REPLY_TIMEOUT_MS);
        let text = match socket.next_text(timeout).await {
            Ok(text) => text,
            Err(SocketError::Timeout) => {
                log::error!("no reply in phase {:?}; abandoning cycle", decoder.phase());
                decoder.abort();
                continue;
            }
            Err(SocketError::Closed) => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        // Decode once at the channel boundary.
        let frame = match protocol::decode_frame(&text) {
            Ok(frame) => frame,
            Err(err @ DecodeError::UnknownPrefix(_)) => {
                log::warn!("{err}");
                continue;
            }
            Err(err) => {
                log::error!("payload decode failed: {err}; abandoning cycle");
                decoder.abort();
                continue;
            }
        };

        match decoder.handle(frame, &mut store) {
            Ok(step) => {
                if let Some(command) = step.send {
                    socket.send(&command).await?;
                }
                if step.render {
                    let scene = store.scene();
                    render::draw(
                        &surface.ctx,
                        &scene,
                        &config.style,
                        surface.width,
                        surface.height,
                        surface.dpr,
                    )
                    .map_err(|err| SessionError::Render(format!("{err:?}")))?;
                    log::info!("scene rendered: {} polygons", scene.polygons.len());
                }
            }
            Err(err) if err.is_cycle_fatal() => {
                log::error!("{err}; abandoning cycle");
                decoder.abort();
            }
            Err(err) => log::warn!("{err}"),
        }
    }
}
