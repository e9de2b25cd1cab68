//! Client construction parameters.
//!
//! Everything the client is built with lives here: the channel endpoint, the
//! requested map extent and subdivision density, and the presentation style.
//! None of it travels on the wire except as the arguments of the initial
//! generation command.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use canvas::render::Style;
use protocol::Command;
use serde::{Deserialize, Serialize};

/// Default WebSocket endpoint of the generation server.
pub const DEFAULT_URL: &str = "ws://localhost:8000/ws/";

/// Client construction parameters, deserializable from the host page.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket endpoint of the generation server.
    pub url: String,
    /// Requested map width in surface pixels.
    pub width: u32,
    /// Requested map height in surface pixels.
    pub height: u32,
    /// Requested horizontal subdivision density.
    pub cells_x: u32,
    /// Requested vertical subdivision density.
    pub cells_y: u32,
    /// Presentation parameters for the render pass.
    pub style: Style,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            width: 600,
            height: 600,
            cells_x: 40,
            cells_y: 10,
            style: Style::default(),
        }
    }
}

impl ClientConfig {
    /// The generation command this configuration opens every cycle with.
    #[must_use]
    pub fn generate_command(&self) -> Command {
        Command::Generate {
            width: self.width,
            height: self.height,
            cells_x: self.cells_x,
            cells_y: self.cells_y,
        }
    }
}
