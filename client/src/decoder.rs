//! The sequential protocol state machine.
//!
//! One generation cycle is a fixed four-step exchange: `GEN` is answered by
//! `GENERATED`, `POL` by `POLYGONS`, `CEN` by `CENTROIDS`, and the terminal
//! payload triggers a render. The decoder owns the cycle phase, is the only
//! writer of the scene store, and is the only place commands are ever
//! emitted from, which keeps the wire to a single outstanding request with
//! no pipelining.
//!
//! The decoder is deliberately free of browser dependencies so the whole
//! transition table is unit-testable natively.

#[cfg(test)]
#[path = "decoder_test.rs"]
mod decoder_test;

use canvas::scene::{SceneError, SceneStore};
use protocol::{Command, ServerFrame};

/// Position within the fixed request/reply sequence of one cycle.
///
/// Phases only ever advance within a cycle; out-of-order frames never move
/// them backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No cycle in flight: not yet opened, or abandoned after a payload
    /// error. Every frame is rejected as out-of-order until [`Decoder::open`].
    Idle,
    /// `GEN` sent; waiting for the generation acknowledgement.
    AwaitingGenerated,
    /// `POL` sent; waiting for the polygon payload.
    AwaitingPolygons,
    /// `CEN` sent; waiting for the centroid payload.
    AwaitingCentroids,
    /// Terminal payload received and rendered; nothing outstanding.
    Ready,
}

impl Phase {
    /// True while a reply is outstanding, i.e. while a reply timeout applies.
    #[must_use]
    pub fn awaiting_reply(self) -> bool {
        matches!(
            self,
            Self::AwaitingGenerated | Self::AwaitingPolygons | Self::AwaitingCentroids
        )
    }
}

/// What the session loop must do after a frame was processed.
#[derive(Debug, Default, PartialEq)]
pub struct Step {
    /// Next command to put on the wire, if the transition emits one.
    pub send: Option<Command>,
    /// The terminal payload arrived: draw the scene.
    pub render: bool,
}

impl Step {
    fn send(command: Command) -> Self {
        Self { send: Some(command), render: false }
    }

    fn render() -> Self {
        Self { send: None, render: true }
    }
}

/// Sequencing and payload errors surfaced by [`Decoder::handle`].
///
/// Recoverable errors leave the phase untouched and the cycle alive;
/// cycle-fatal ones require the caller to [`Decoder::abort`] and start a
/// fresh cycle explicitly.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    /// Server reports no active generation session. Recoverable.
    #[error("no active generation session on the server")]
    SessionAbsent,
    /// Server rejected the last command as malformed. Recoverable.
    #[error("server rejected the last command as invalid")]
    CommandRejected,
    /// A well-formed frame arrived outside its expected phase. Recoverable.
    #[error("{frame} frame arrived in phase {phase:?}")]
    OutOfOrder {
        /// Wire prefix of the rejected frame.
        frame: &'static str,
        /// Phase the decoder was in when it arrived.
        phase: Phase,
    },
    /// The centroid payload broke the scene invariant. Cycle-fatal.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl ProtocolError {
    /// Whether the current cycle must be abandoned.
    #[must_use]
    pub fn is_cycle_fatal(&self) -> bool {
        matches!(self, Self::Scene(_))
    }
}

/// The sequential decoder driving one generation cycle at a time.
#[derive(Debug)]
pub struct Decoder {
    phase: Phase,
    generate: Command,
}

impl Decoder {
    /// Build an idle decoder that opens cycles with the given generation
    /// command.
    #[must_use]
    pub fn new(generate: Command) -> Self {
        Self { phase: Phase::Idle, generate }
    }

    /// Start a fresh generation cycle: clear the store, enter the first
    /// phase, and hand back the command to put on the wire. Called once the
    /// channel is open, and again only after an explicit abort.
    pub fn open(&mut self, store: &mut SceneStore) -> Command {
        store.clear();
        self.phase = Phase::AwaitingGenerated;
        self.generate
    }

    /// Process one decoded frame against the current phase.
    ///
    /// # Errors
    ///
    /// Recoverable errors ([`ProtocolError::SessionAbsent`],
    /// [`ProtocolError::CommandRejected`], [`ProtocolError::OutOfOrder`])
    /// leave the phase untouched; a [`ProtocolError::Scene`] error is
    /// cycle-fatal and the caller must [`Self::abort`].
    pub fn handle(
        &mut self,
        frame: ServerFrame,
        store: &mut SceneStore,
    ) -> Result<Step, ProtocolError> {
        match (self.phase, frame) {
            (Phase::AwaitingGenerated, ServerFrame::Generated) => {
                self.phase = Phase::AwaitingPolygons;
                Ok(Step::send(Command::Polygons))
            }
            (Phase::AwaitingPolygons, ServerFrame::Polygons(rings)) => {
                store.set_polygons(rings);
                self.phase = Phase::AwaitingCentroids;
                Ok(Step::send(Command::Centroids))
            }
            (Phase::AwaitingCentroids, ServerFrame::Centroids(points)) => {
                store.set_centroids(points)?;
                self.phase = Phase::Ready;
                Ok(Step::render())
            }
            (_, ServerFrame::NoGame) => Err(ProtocolError::SessionAbsent),
            (_, ServerFrame::Invalid) => Err(ProtocolError::CommandRejected),
            (phase, frame) => Err(ProtocolError::OutOfOrder { frame: frame.name(), phase }),
        }
    }

    /// Abandon the current cycle after a payload error. The decoder ignores
    /// everything until the next [`Self::open`].
    pub fn abort(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Current position in the cycle.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }
}
