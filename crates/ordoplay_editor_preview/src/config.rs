// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tunable constants for transition previews.

use crate::error::{PreviewError, Result};
use serde::{Deserialize, Serialize};

/// Preview configuration shared by the timeline model, clock and drag controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Setter writes closer than this to the current value are ignored
    pub change_epsilon: f32,
    /// State durations at or below this are treated as degenerate (seconds)
    pub duration_epsilon: f32,
    /// Floor for the transition duration (seconds)
    pub min_transition_duration: f32,
    /// Extra time appended to the timeline so the to-bar tail stays visible (seconds)
    pub timeline_trailer: f32,
    /// Lowest exit time reachable by dragging
    pub drag_exit_time_min: f32,
    /// Highest exit time reachable by dragging
    pub drag_exit_time_max: f32,
    /// Horizontal grab distance around the exit-time handle (pixels)
    pub handle_tolerance_px: f32,
    /// Vertical grab slack around the from-bar lane (pixels)
    pub lane_tolerance_px: f32,
    /// Number of line segments used to preview a blend curve
    pub curve_segments: usize,
    /// Floor for clock durations (seconds)
    pub min_clock_duration: f32,
    /// Floor for the playback speed multiplier
    pub min_speed: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            change_epsilon: 1e-4,
            duration_epsilon: 0.001,
            min_transition_duration: 0.01,
            timeline_trailer: 0.1,
            drag_exit_time_min: 0.05,
            drag_exit_time_max: 0.95,
            handle_tolerance_px: 10.0,
            lane_tolerance_px: 5.0,
            curve_segments: 30,
            min_clock_duration: 0.001,
            min_speed: 0.01,
        }
    }
}

impl PreviewConfig {
    /// Parse a config from RON text and validate it
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        tracing::debug!(?config, "Loaded preview config");
        Ok(config)
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("change_epsilon", self.change_epsilon),
            ("duration_epsilon", self.duration_epsilon),
            ("min_transition_duration", self.min_transition_duration),
            ("min_clock_duration", self.min_clock_duration),
            ("min_speed", self.min_speed),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be a positive number, got {value}")));
            }
        }

        let non_negative = [
            ("timeline_trailer", self.timeline_trailer),
            ("handle_tolerance_px", self.handle_tolerance_px),
            ("lane_tolerance_px", self.lane_tolerance_px),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, format!("must be zero or more, got {value}")));
            }
        }

        let (min, max) = (self.drag_exit_time_min, self.drag_exit_time_max);
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
            return Err(invalid(
                "drag_exit_time_min",
                format!("drag range [{min}, {max}] must be ordered and inside [0, 1]"),
            ));
        }

        if self.curve_segments == 0 {
            return Err(invalid("curve_segments", "must be at least 1".to_string()));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> PreviewError {
    PreviewError::InvalidConfig { field, reason }
}
