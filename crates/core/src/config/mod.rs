use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{progress::LineCap, Result};

/// Top-level configuration structure for the application.
///
/// Every section falls back to its defaults, so a config file only needs to
/// mention the values it overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub animation: AnimationConfig,
    pub hold: HoldConfig,
    pub progress: ProgressConfig,
}

impl AppConfig {
    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Layout and import settings for the soundboard grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Empty tiles shown before anything has been dropped.
    pub placeholder_count: usize,
    /// Upper bound on tiles per row.
    pub max_per_line: usize,
    /// Lower bound on tiles per row, however narrow the board gets.
    pub min_per_line: usize,
    /// Pause between accepted files while importing a drop.
    pub import_throttle_ms: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            placeholder_count: 12,
            max_per_line: 10,
            min_per_line: 1,
            import_throttle_ms: 50,
        }
    }
}

impl BoardConfig {
    pub fn import_throttle(&self) -> Duration {
        Duration::from_millis(self.import_throttle_ms)
    }
}

/// Timing for the poof animation shown when a tile disappears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub tick_ms: u64,
    pub run_length_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tick_ms: 30,
            run_length_ms: 300,
        }
    }
}

impl AnimationConfig {
    /// Redraw cadence, never shorter than a millisecond.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn run_length_micros(&self) -> u64 {
        self.run_length_ms.saturating_mul(1_000)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldConfig {
    pub threshold_ms: u64,
}

impl Default for HoldConfig {
    fn default() -> Self {
        Self { threshold_ms: 750 }
    }
}

impl HoldConfig {
    pub fn threshold(&self) -> Duration {
        Duration::from_millis(self.threshold_ms)
    }
}

/// Initial look of a circular progress dial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub line_width: i32,
    pub line_cap: LineCap,
    pub center_fill_color: String,
    pub radius_fill_color: String,
    pub progress_fill_color: String,
    pub center_filled: bool,
    pub radius_filled: bool,
    pub font: String,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            line_width: 1,
            line_cap: LineCap::Butt,
            center_fill_color: "#adadad".to_string(),
            radius_fill_color: "#d3d3d3".to_string(),
            progress_fill_color: "#4a90d9".to_string(),
            center_filled: false,
            radius_filled: false,
            font: "Inter".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.board.placeholder_count, 12);
        assert_eq!(config.animation.run_length_micros(), 300_000);
        assert_eq!(config.hold.threshold(), Duration::from_millis(750));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config =
            AppConfig::from_json(r#"{ "board": { "import_throttle_ms": 5 }, "progress": { "line_cap": "round" } }"#)
                .unwrap();
        assert_eq!(config.board.import_throttle(), Duration::from_millis(5));
        assert_eq!(config.board.max_per_line, 10);
        assert_eq!(config.progress.line_cap, LineCap::Round);
        assert_eq!(config.progress.font, "Inter");
    }

    #[test]
    fn zero_tick_is_raised_to_a_millisecond() {
        let config = AppConfig::from_json(r#"{ "animation": { "tick_ms": 0 } }"#).unwrap();
        assert_eq!(config.animation.tick(), Duration::from_millis(1));
    }

    #[test]
    fn huge_run_length_saturates() {
        let animation = AnimationConfig {
            run_length_ms: u64::MAX,
            ..AnimationConfig::default()
        };
        assert_eq!(animation.run_length_micros(), u64::MAX);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(AppConfig::from_json("{ board: ").is_err());
    }
}
