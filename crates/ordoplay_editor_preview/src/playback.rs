// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback clock shared by state and transition previews.

use crate::config::PreviewConfig;
use serde::{Deserialize, Serialize};

/// Raw playback state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Current playback time (seconds)
    pub current_time: f32,
    /// Length of one pass (seconds)
    pub duration: f32,
    /// Whether the clock advances on tick
    pub is_playing: bool,
    /// Whether reaching the end wraps back to the start
    pub is_looping: bool,
    /// Playback speed multiplier
    pub speed: f32,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock is not playing
    Idle,
    /// Time moved forward
    Advanced,
    /// Time passed the end and wrapped
    Looped,
    /// Time reached the end and playback stopped
    Finished,
}

/// Playback clock with loop, pause and speed control
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    state: PlaybackState,
    min_duration: f32,
    min_speed: f32,
}

impl PlaybackClock {
    /// Create a stopped, looping clock over `duration` seconds
    pub fn new(duration: f32) -> Self {
        Self::with_config(duration, &PreviewConfig::default())
    }

    /// Create a clock using the floors from `config`
    pub fn with_config(duration: f32, config: &PreviewConfig) -> Self {
        let mut clock = Self {
            state: PlaybackState {
                current_time: 0.0,
                duration: config.min_clock_duration,
                is_playing: false,
                is_looping: true,
                speed: 1.0,
            },
            min_duration: config.min_clock_duration,
            min_speed: config.min_speed,
        };
        clock.set_duration(duration);
        clock
    }

    /// Advance the clock by `delta_seconds` of wall time
    pub fn tick(&mut self, delta_seconds: f32) -> TickOutcome {
        self.clamp_to_duration();

        if !self.state.is_playing {
            return TickOutcome::Idle;
        }

        let delta = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };
        self.state.current_time += delta * self.state.speed;

        if self.state.current_time < self.state.duration {
            return TickOutcome::Advanced;
        }

        if self.state.is_looping {
            self.state.current_time = self.state.current_time.rem_euclid(self.state.duration);
            tracing::trace!(time = self.state.current_time, "Playback wrapped");
            TickOutcome::Looped
        } else {
            self.state.current_time = self.state.duration;
            self.state.is_playing = false;
            TickOutcome::Finished
        }
    }

    /// Jump to a normalized position; play state is left alone
    pub fn seek(&mut self, normalized_time: f32) {
        let normalized = if normalized_time.is_finite() {
            normalized_time.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.state.current_time = normalized * self.state.duration;
    }

    /// Jump to an absolute time in seconds
    pub fn seek_seconds(&mut self, time: f32) {
        self.seek(time / self.state.duration);
    }

    /// Change the pass length without rescaling the current time
    pub fn set_duration(&mut self, duration: f32) {
        self.state.duration = if duration.is_finite() {
            duration.max(self.min_duration)
        } else {
            self.min_duration
        };
    }

    /// Current time divided by duration
    pub fn normalized_time(&self) -> f32 {
        if self.state.duration > 0.0 {
            self.state.current_time / self.state.duration
        } else {
            0.0
        }
    }

    /// Play from current position
    pub fn play(&mut self) {
        if self.state.current_time >= self.state.duration && !self.state.is_looping {
            self.state.current_time = 0.0;
        }
        self.state.is_playing = true;
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.state.is_playing = false;
    }

    /// Stop and rewind to the beginning
    pub fn stop(&mut self) {
        self.state.is_playing = false;
        self.state.current_time = 0.0;
    }

    /// Toggle play/pause
    pub fn toggle_playback(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Enable or disable looping
    pub fn set_looping(&mut self, looping: bool) {
        self.state.is_looping = looping;
    }

    /// Set the speed multiplier
    pub fn set_speed(&mut self, speed: f32) {
        self.state.speed = if speed.is_finite() {
            speed.max(self.min_speed)
        } else {
            1.0
        };
    }

    /// Current time in seconds
    pub fn current_time(&self) -> f32 {
        self.state.current_time
    }

    /// Pass length in seconds
    pub fn duration(&self) -> f32 {
        self.state.duration
    }

    /// Is currently playing
    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    /// Is looping enabled
    pub fn is_looping(&self) -> bool {
        self.state.is_looping
    }

    /// Speed multiplier
    pub fn speed(&self) -> f32 {
        self.state.speed
    }

    /// Snapshot of the raw state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    fn clamp_to_duration(&mut self) {
        self.state.current_time = self.state.current_time.clamp(0.0, self.state.duration);
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_then_zero_tick_keeps_position() {
        let mut clock = PlaybackClock::new(2.0);
        clock.play();
        clock.seek(0.5);
        clock.tick(0.0);
        assert_eq!(clock.normalized_time(), 0.5);
    }

    #[test]
    fn test_looping_wraps_with_modulo() {
        let mut clock = PlaybackClock::new(2.0);
        clock.set_looping(true);
        clock.play();
        assert_eq!(clock.tick(3.0), TickOutcome::Looped);
        assert_eq!(clock.current_time(), 1.0);
        assert!(clock.is_playing());
    }

    #[test]
    fn test_non_looping_clamps_and_stops() {
        let mut clock = PlaybackClock::new(2.0);
        clock.set_looping(false);
        clock.play();
        assert_eq!(clock.tick(5.0), TickOutcome::Finished);
        assert_eq!(clock.current_time(), 2.0);
        assert!(!clock.is_playing());
        assert_eq!(clock.normalized_time(), 1.0);
    }

    #[test]
    fn test_paused_clock_does_not_advance() {
        let mut clock = PlaybackClock::new(2.0);
        assert_eq!(clock.tick(1.0), TickOutcome::Idle);
        assert_eq!(clock.current_time(), 0.0);
    }

    #[test]
    fn test_speed_scales_delta() {
        let mut clock = PlaybackClock::new(4.0);
        clock.set_speed(2.0);
        clock.play();
        clock.tick(0.5);
        assert_eq!(clock.current_time(), 1.0);
    }

    #[test]
    fn test_speed_is_floored() {
        let mut clock = PlaybackClock::new(4.0);
        clock.set_speed(-3.0);
        assert_eq!(clock.speed(), PreviewConfig::default().min_speed);
    }

    #[test]
    fn test_seek_does_not_change_play_state() {
        let mut clock = PlaybackClock::new(2.0);
        clock.seek(0.25);
        assert!(!clock.is_playing());
        clock.play();
        clock.seek(1.5);
        assert!(clock.is_playing());
        assert_eq!(clock.current_time(), 2.0);
    }

    #[test]
    fn test_set_duration_reclamps_on_next_tick() {
        let mut clock = PlaybackClock::new(4.0);
        clock.seek(0.75);
        clock.set_duration(2.0);
        assert_eq!(clock.current_time(), 3.0);
        clock.tick(0.0);
        assert_eq!(clock.current_time(), 2.0);
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut clock = PlaybackClock::new(2.0);
        clock.play();
        clock.seek(0.5);
        clock.tick(-1.0);
        assert_eq!(clock.current_time(), 1.0);
    }

    #[test]
    fn test_degenerate_duration_is_floored() {
        let clock = PlaybackClock::new(0.0);
        assert!(clock.duration() > 0.0);
        assert_eq!(clock.normalized_time(), 0.0);
    }

    #[test]
    fn test_stop_rewinds() {
        let mut clock = PlaybackClock::new(2.0);
        clock.play();
        clock.tick(0.5);
        clock.stop();
        assert!(!clock.is_playing());
        assert_eq!(clock.current_time(), 0.0);
    }

    #[test]
    fn test_play_after_finish_restarts() {
        let mut clock = PlaybackClock::new(1.0);
        clock.set_looping(false);
        clock.play();
        clock.tick(2.0);
        clock.toggle_playback();
        assert!(clock.is_playing());
        assert_eq!(clock.current_time(), 0.0);
    }
}
