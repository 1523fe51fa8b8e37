//! Editor configuration parsed from environment variables.
//!
//! Every value has a default, so an empty environment yields a working editor.
//! Malformed values are errors; they never fall back to the default.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::consts::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DEFAULT_GRID_SIZE, DEFAULT_SNAP_THRESHOLD, HANDLE_RADIUS_PX,
    MIN_LAYER_SIZE,
};

/// Errors produced while building an [`EditorConfig`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("config parse failed: {var}={value:?}")]
    Parse { var: String, value: String },

    /// A parsed value is outside its valid range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How `snap_to_guides` picks among several guides within the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapStrategy {
    /// Closest guide wins; ties go to the earlier candidate.
    #[default]
    Nearest,
    /// First candidate in list order wins.
    First,
}

/// Tunables for placement, snapping and hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Logical canvas width.
    pub canvas_width: f64,
    /// Logical canvas height.
    pub canvas_height: f64,
    /// Grid pitch for snap-to-grid.
    pub grid_size: f64,
    /// Minimum width/height after a resize.
    pub min_layer_size: f64,
    /// Guide snapping distance, in logical units.
    pub snap_threshold: f64,
    pub snap_strategy: SnapStrategy,
    /// Round dragged positions to the grid.
    pub snap_to_grid: bool,
    /// Pull dragged layers onto alignment guides.
    pub snap_to_guides: bool,
    /// Resize handle hit radius, in screen pixels.
    pub handle_radius_px: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            grid_size: DEFAULT_GRID_SIZE,
            min_layer_size: MIN_LAYER_SIZE,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            snap_strategy: SnapStrategy::Nearest,
            snap_to_grid: false,
            snap_to_guides: true,
            handle_radius_px: HANDLE_RADIUS_PX,
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `CARD_CANVAS_WIDTH` / `CARD_CANVAS_HEIGHT`: default 800 × 600
    /// - `CARD_GRID_SIZE`: default 10
    /// - `CARD_MIN_LAYER_SIZE`: default 20
    /// - `CARD_SNAP_THRESHOLD`: default 5
    /// - `CARD_SNAP_STRATEGY`: `nearest` (default) or `first`
    /// - `CARD_SNAP_TO_GRID`: default `false`
    /// - `CARD_SNAP_TO_GUIDES`: default `true`
    /// - `CARD_HANDLE_RADIUS_PX`: default 8
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var).inspect_err(|err| error!(%err, "editor config rejected"))
    }

    /// Build config from an arbitrary key lookup. `from_env` delegates here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cfg = Self {
            canvas_width: parse_f64(&lookup, "CARD_CANVAS_WIDTH", defaults.canvas_width)?,
            canvas_height: parse_f64(&lookup, "CARD_CANVAS_HEIGHT", defaults.canvas_height)?,
            grid_size: parse_f64(&lookup, "CARD_GRID_SIZE", defaults.grid_size)?,
            min_layer_size: parse_f64(&lookup, "CARD_MIN_LAYER_SIZE", defaults.min_layer_size)?,
            snap_threshold: parse_f64(&lookup, "CARD_SNAP_THRESHOLD", defaults.snap_threshold)?,
            snap_strategy: parse_strategy(lookup("CARD_SNAP_STRATEGY").as_deref())?,
            snap_to_grid: parse_bool(&lookup, "CARD_SNAP_TO_GRID", defaults.snap_to_grid)?,
            snap_to_guides: parse_bool(&lookup, "CARD_SNAP_TO_GUIDES", defaults.snap_to_guides)?,
            handle_radius_px: parse_f64(&lookup, "CARD_HANDLE_RADIUS_PX", defaults.handle_radius_px)?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject sizes that would make the geometry degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("grid_size", self.grid_size),
            ("min_layer_size", self.min_layer_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [("snap_threshold", self.snap_threshold), ("handle_radius_px", self.handle_radius_px)];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must not be negative, got {value}")));
            }
        }
        Ok(())
    }
}

fn env_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) => Some(value),
        Err(std::env::VarError::NotPresent) => None,
        Err(std::env::VarError::NotUnicode(_)) => {
            warn!(var = key, "ignoring non-unicode environment value");
            None
        }
    }
}

fn parse_f64<F>(lookup: &F, key: &str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::Parse { var: key.to_owned(), value: raw.clone() })
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Parse { var: key.to_owned(), value: raw }),
    }
}

fn parse_strategy(raw: Option<&str>) -> Result<SnapStrategy, ConfigError> {
    match raw.map(str::trim).unwrap_or("nearest") {
        "nearest" => Ok(SnapStrategy::Nearest),
        "first" => Ok(SnapStrategy::First),
        other => Err(ConfigError::Parse { var: "CARD_SNAP_STRATEGY".to_owned(), value: other.to_owned() }),
    }
}
