// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transition window model.
//!
//! Owns exit time, transition duration and the from/to state durations, and
//! derives the timeline length, the dual-bar pixel layout and transition
//! progress from them.
//!
//! Setters ignore writes within `change_epsilon` of the current value. Every
//! effective write bumps [`TransitionWindowModel::layout_revision`], which UI
//! code uses to decide whether to re-layout.

use crate::config::PreviewConfig;
use serde::{Deserialize, Serialize};

/// The four quantities describing a transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionWindow {
    /// Normalized exit time relative to the from-state duration
    pub exit_time: f32,
    /// Blend duration (seconds)
    pub transition_duration: f32,
    /// From-state clip duration (seconds)
    pub from_duration: f32,
    /// To-state clip duration (seconds)
    pub to_duration: f32,
}

/// Edited values handed back to the authoring layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionSettings {
    /// Normalized exit time
    pub exit_time: f32,
    /// Blend duration (seconds)
    pub transition_duration: f32,
    /// Whether the duration was typed in rather than derived
    pub duration_pinned: bool,
}

/// Pixel layout of the from/to bars on a track
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BarLayout {
    /// From-bar left edge
    pub from_bar_start_px: f32,
    /// From-bar width
    pub from_bar_width_px: f32,
    /// To-bar left edge (also the exit-time handle position)
    pub to_bar_start_px: f32,
    /// To-bar width
    pub to_bar_width_px: f32,
    /// Left edge of the span where both bars are active
    pub overlap_start_px: f32,
    /// Width of the overlap span, never negative
    pub overlap_width_px: f32,
}

impl BarLayout {
    /// Right edge of the from-bar
    pub fn from_bar_end_px(&self) -> f32 {
        self.from_bar_start_px + self.from_bar_width_px
    }

    /// Right edge of the to-bar
    pub fn to_bar_end_px(&self) -> f32 {
        self.to_bar_start_px + self.to_bar_width_px
    }
}

/// Single source of truth for a transition's timing
#[derive(Debug, Clone)]
pub struct TransitionWindowModel {
    window: TransitionWindow,
    duration_pinned: bool,
    config: PreviewConfig,
    recalculations: u64,
    layout_revision: u64,
}

impl TransitionWindowModel {
    /// Create a model with a derived transition duration
    pub fn new(exit_time: f32, from_duration: f32, to_duration: f32) -> Self {
        Self::with_config(exit_time, from_duration, to_duration, PreviewConfig::default())
    }

    /// Create a model with a derived transition duration and custom tuning
    pub fn with_config(
        exit_time: f32,
        from_duration: f32,
        to_duration: f32,
        config: PreviewConfig,
    ) -> Self {
        let mut model = Self {
            window: TransitionWindow {
                exit_time: sanitize_unit(exit_time),
                transition_duration: config.min_transition_duration,
                from_duration: sanitize_duration(from_duration),
                to_duration: sanitize_duration(to_duration),
            },
            duration_pinned: false,
            config,
            recalculations: 0,
            layout_revision: 0,
        };
        model.recalculate_transition_duration();
        model
    }

    /// Restore a model from authored values; the stored duration is kept as pinned
    pub fn from_window(window: TransitionWindow, config: PreviewConfig) -> Self {
        let mut model = Self::with_config(
            window.exit_time,
            window.from_duration,
            window.to_duration,
            config,
        );
        if window.transition_duration.is_finite() {
            model.window.transition_duration =
                window.transition_duration.max(config.min_transition_duration);
            model.duration_pinned = true;
        }
        model
    }

    /// Re-derive the transition duration from exit time and clip durations; unpins it
    pub fn recalculate_transition_duration(&mut self) {
        let w = &mut self.window;
        let min = self.config.min_transition_duration;

        w.transition_duration = if w.from_duration <= self.config.duration_epsilon
            || w.to_duration <= self.config.duration_epsilon
        {
            tracing::warn!(
                from = w.from_duration,
                to = w.to_duration,
                "Degenerate state duration, using minimum transition duration"
            );
            min
        } else {
            let exit_seconds = w.exit_time * w.from_duration;
            let to_end = exit_seconds + w.to_duration;
            (w.from_duration.min(to_end) - exit_seconds).max(min)
        };

        self.duration_pinned = false;
        self.recalculations += 1;
        self.layout_revision += 1;
    }

    /// Set the normalized exit time, clamped to [0, 1]
    pub fn set_exit_time(&mut self, exit_time: f32) -> bool {
        let exit_time = sanitize_unit(exit_time);
        if !self.differs(self.window.exit_time, exit_time) {
            return false;
        }
        self.window.exit_time = exit_time;
        self.upstream_changed();
        true
    }

    /// Set the from-state duration
    pub fn set_from_duration(&mut self, seconds: f32) -> bool {
        let seconds = sanitize_duration(seconds);
        if !self.differs(self.window.from_duration, seconds) {
            return false;
        }
        self.window.from_duration = seconds;
        self.upstream_changed();
        true
    }

    /// Set the to-state duration
    pub fn set_to_duration(&mut self, seconds: f32) -> bool {
        let seconds = sanitize_duration(seconds);
        if !self.differs(self.window.to_duration, seconds) {
            return false;
        }
        self.window.to_duration = seconds;
        self.upstream_changed();
        true
    }

    /// Set the transition duration directly; pins it until an upstream value changes
    pub fn set_transition_duration(&mut self, seconds: f32) -> bool {
        if !seconds.is_finite() {
            return false;
        }
        let seconds = seconds.max(self.config.min_transition_duration);
        if !self.differs(self.window.transition_duration, seconds) {
            return false;
        }
        self.window.transition_duration = seconds;
        self.duration_pinned = true;
        self.layout_revision += 1;
        true
    }

    /// Drop a pinned duration and derive it again
    pub fn unpin_transition_duration(&mut self) {
        if self.duration_pinned {
            self.recalculate_transition_duration();
        }
    }

    /// Timeline length including the visual trailer
    pub fn total_duration(&self) -> f32 {
        self.window.from_duration.max(self.to_bar_end()) + self.config.timeline_trailer
    }

    /// Exit time converted to seconds
    pub fn exit_time_seconds(&self) -> f32 {
        self.window.exit_time * self.window.from_duration
    }

    /// Time at which the to-state clip ends
    pub fn to_bar_end(&self) -> f32 {
        self.exit_time_seconds() + self.window.to_duration
    }

    /// Pixels per second for a track of `track_width_px`
    pub fn pixels_per_second(&self, track_width_px: f32) -> f32 {
        let total = self.total_duration();
        if total > 0.0 {
            track_width_px.max(0.0) / total
        } else {
            0.0
        }
    }

    /// Bar layout for a track of `track_width_px`
    pub fn bar_layout(&self, track_width_px: f32) -> BarLayout {
        let pps = self.pixels_per_second(track_width_px);

        let from_bar_start_px: f32 = 0.0;
        let from_bar_width_px = self.window.from_duration * pps;
        let to_bar_start_px = self.exit_time_seconds() * pps;
        let to_bar_width_px = self.window.to_duration * pps;

        let overlap_start_px = from_bar_start_px.max(to_bar_start_px);
        let overlap_end_px = (from_bar_start_px + from_bar_width_px)
            .min(to_bar_start_px + to_bar_width_px);

        BarLayout {
            from_bar_start_px,
            from_bar_width_px,
            to_bar_start_px,
            to_bar_width_px,
            overlap_start_px,
            overlap_width_px: (overlap_end_px - overlap_start_px).max(0.0),
        }
    }

    /// Transition progress in [0, 1] at `clock_time` seconds
    pub fn progress(&self, clock_time: f32) -> f32 {
        let exit_seconds = self.exit_time_seconds();
        if clock_time.is_nan() || clock_time <= exit_seconds {
            return 0.0;
        }
        let duration = self.window.transition_duration;
        if duration <= self.config.duration_epsilon || clock_time >= exit_seconds + duration {
            return 1.0;
        }
        ((clock_time - exit_seconds) / duration).clamp(0.0, 1.0)
    }

    /// Normalized exit time
    pub fn exit_time(&self) -> f32 {
        self.window.exit_time
    }

    /// Blend duration in seconds
    pub fn transition_duration(&self) -> f32 {
        self.window.transition_duration
    }

    /// From-state duration in seconds
    pub fn from_duration(&self) -> f32 {
        self.window.from_duration
    }

    /// To-state duration in seconds
    pub fn to_duration(&self) -> f32 {
        self.window.to_duration
    }

    /// Whether the transition duration was set directly
    pub fn is_duration_pinned(&self) -> bool {
        self.duration_pinned
    }

    /// Copy of the underlying values
    pub fn window(&self) -> TransitionWindow {
        self.window
    }

    /// Values to persist back to the asset
    pub fn settings(&self) -> TransitionSettings {
        TransitionSettings {
            exit_time: self.window.exit_time,
            transition_duration: self.window.transition_duration,
            duration_pinned: self.duration_pinned,
        }
    }

    /// Tuning in use
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Number of times the transition duration was derived
    pub fn recalculation_count(&self) -> u64 {
        self.recalculations
    }

    /// Bumped on every effective change
    pub fn layout_revision(&self) -> u64 {
        self.layout_revision
    }

    fn differs(&self, current: f32, new: f32) -> bool {
        (current - new).abs() >= self.config.change_epsilon
    }

    fn upstream_changed(&mut self) {
        self.recalculate_transition_duration();
    }
}

fn sanitize_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn sanitize_duration(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}
