use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("surface must be non-empty, got {width}x{height}")]
    EmptySurface { width: u32, height: u32 },
    #[error("brush radius must be positive, got {0}")]
    BrushRadius(f64),
    #[error("reveal threshold must be a percentage in 0..=100, got {0}")]
    Threshold(f64),
    #[error("sample stride must be at least 1")]
    SampleStride,
    #[error("probability must be in 0..=1, got {0}")]
    Probability(f64),
    #[error("every-nth check policy needs n >= 1")]
    EveryNth,
    #[error("fireworks interval must be positive, got {0}")]
    Interval(f64),
    #[error("fireworks duration must be positive, got {0}")]
    Duration(f64),
    #[error("particles per burst must be in (0, {max}], got {got}")]
    ParticleCount { got: f64, max: f64 },
}

/// Failures while mounting the card into the page.
#[derive(Debug, Error)]
pub enum CardError {
    #[error("no window")]
    NoWindow,
    #[error("no document")]
    NoDocument,
    #[error("element `{0}` is not a canvas")]
    NotACanvas(String),
    #[error("2d context unavailable")]
    ContextUnavailable,
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("js error: {0}")]
    Js(String),
    #[cfg(feature = "serde_json")]
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<JsValue> for CardError {
    fn from(value: JsValue) -> Self {
        CardError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<CardError> for JsValue {
    fn from(err: CardError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
