//! Scratch Heart core crate.
//!
//! A gold, glittery heart hides a message on a `<canvas>`; dragging the mouse or
//! a finger scratches the gold away and, once enough of it is gone, the card
//! reveals itself and fires confetti. The drawing and reveal logic is written
//! against the `Surface` trait so it runs both in the browser (`CanvasSurface`)
//! and headless (`PixmapSurface`), which is what the native tests use.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod fireworks;
pub mod geometry;
pub mod mask;
pub mod scratch;
pub mod surface;

#[cfg(target_arch = "wasm32")]
mod card; // DOM glue, browser only

pub use config::{CardConfig, CheckPolicy, FireworksConfig, ScratchConfig};
pub use error::{CardError, ConfigError};
pub use geometry::{ClientRect, Point, map_client_point};
pub use mask::paint_mask;
pub use scratch::{Phase, PointerInput, ScratchPad, opaque_percentage};
pub use surface::{PixmapSurface, Surface};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    init_logging();
}

/// Route `log` records to the browser console.
#[cfg(target_arch = "wasm32")]
fn init_logging() {
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::warn!("logger already initialized");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

/// Mount the card with default settings. `on_reveal` is called once, after
/// the card has been revealed.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_card(on_reveal: Option<js_sys::Function>) -> Result<(), JsValue> {
    card::mount(CardConfig::default(), on_reveal).map_err(Into::into)
}

/// Mount the card from a JSON `CardConfig`; missing fields take defaults.
#[cfg(all(target_arch = "wasm32", feature = "serde_json"))]
#[wasm_bindgen]
pub fn start_card_with_config(
    json: &str,
    on_reveal: Option<js_sys::Function>,
) -> Result<(), JsValue> {
    let config = CardConfig::from_json(json)?;
    card::mount(config, on_reveal).map_err(Into::into)
}

/// Uncover the card without scratching.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn reveal_card() {
    card::reveal();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn is_card_revealed() -> bool {
    card::is_revealed()
}
