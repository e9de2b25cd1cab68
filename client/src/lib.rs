//! Browser client for the territory map server.
//!
//! Drives the protocol pipeline end to end: open the channel, walk the
//! generate → polygons → centroids handshake, and hand the completed scene
//! to the renderer. The pure pieces (configuration, the decoder state
//! machine, connection states) compile and test natively; everything that
//! needs a browser is gated behind `target_arch = "wasm32"`.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Client construction parameters |
//! | [`decoder`] | The sequential protocol state machine |
//! | [`net`] | Connection lifecycle over the browser WebSocket |
//! | `app` | Session loop wiring socket, decoder, store and renderer |
//! | `surface` | Drawing-surface allocation and DOM attachment |

pub mod config;
pub mod decoder;
pub mod net;

#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
mod surface;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Install the panic hook and console logger when the module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// Start a client session. `config_json` overrides the [`config::ClientConfig`]
/// defaults field by field; pass nothing to take them all.
///
/// # Errors
///
/// Returns `Err` when `config_json` is not a valid configuration document.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn boot(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref() {
        Some(raw) => serde_json::from_str::<config::ClientConfig>(raw)
            .map_err(|err| JsValue::from_str(&format!("bad client config: {err}")))?,
        None => config::ClientConfig::default(),
    };

    wasm_bindgen_futures::spawn_local(app::run(config));
    Ok(())
}
