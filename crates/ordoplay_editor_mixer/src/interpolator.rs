// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rate-limited smoothing of 2D blend-space parameters.

use egui::Vec2;

/// Moves a value toward a target at a bounded rate
pub struct ParameterInterpolator;

impl ParameterInterpolator {
    /// Step `current` toward `target` by at most `speed * delta_time`.
    ///
    /// Returns the new value and whether it is still short of the target.
    pub fn step(current: Vec2, target: Vec2, speed: f32, delta_time: f32) -> (Vec2, bool) {
        let max_step = (speed * delta_time).max(0.0);
        let offset = target - current;
        let distance = offset.length();

        if !distance.is_finite() {
            return (current, false);
        }
        if distance <= max_step {
            return (target, false);
        }

        (current + offset / distance * max_step, true)
    }
}

/// A blend position chasing its target
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlendPosition2D {
    /// Value fed to the blend space this frame
    pub current: Vec2,
    /// Value the user asked for
    pub target: Vec2,
}

impl BlendPosition2D {
    /// Create a position already at rest
    pub fn at(position: Vec2) -> Self {
        Self {
            current: position,
            target: position,
        }
    }

    /// Advance one frame; returns whether it is still moving
    pub fn step(&mut self, speed: f32, delta_time: f32) -> bool {
        let (current, moving) = ParameterInterpolator::step(self.current, self.target, speed, delta_time);
        self.current = current;
        moving
    }

    /// Jump straight to the target
    pub fn snap(&mut self) {
        self.current = self.target;
    }

    /// Whether current has reached target
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }
}

/// Blend positions for one preview: the previewed state, plus the to-state during transitions
#[derive(Debug, Clone, PartialEq)]
pub struct BlendPositionTracker {
    /// Primary (from-state) position
    pub primary: BlendPosition2D,
    /// Secondary (to-state) position, only tracked in transition previews
    pub secondary: Option<BlendPosition2D>,
    /// Units per second
    pub speed: f32,
}

impl BlendPositionTracker {
    /// Track a single state's blend position
    pub fn new(position: Vec2, speed: f32) -> Self {
        Self {
            primary: BlendPosition2D::at(position),
            secondary: None,
            speed,
        }
    }

    /// Track both sides of a transition
    pub fn with_secondary(mut self, position: Vec2) -> Self {
        self.secondary = Some(BlendPosition2D::at(position));
        self
    }

    /// Set the primary target
    pub fn set_primary_target(&mut self, target: Vec2) {
        self.primary.target = target;
    }

    /// Set the secondary target, starting to track it if needed
    pub fn set_secondary_target(&mut self, target: Vec2) {
        self.secondary.get_or_insert_with(|| BlendPosition2D::at(target)).target = target;
    }

    /// Stop tracking the to-state
    pub fn clear_secondary(&mut self) {
        self.secondary = None;
    }

    /// Advance both positions; returns whether either is still moving
    pub fn tick(&mut self, delta_time: f32) -> bool {
        let primary_moving = self.primary.step(self.speed, delta_time);
        let secondary_moving = self
            .secondary
            .as_mut()
            .is_some_and(|s| s.step(self.speed, delta_time));
        primary_moving || secondary_moving
    }
}
