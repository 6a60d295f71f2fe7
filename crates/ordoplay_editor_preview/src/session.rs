// SPDX-License-Identifier: MIT OR Apache-2.0
//! Preview sessions.
//!
//! A session owns everything one preview panel needs. Nothing is shared
//! between sessions; open two panels, get two sessions.

use crate::config::PreviewConfig;
use crate::curve::{BlendCurve, BlendCurveEvaluator};
use crate::drag::{DragTarget, TimelineDragController, TrackGeometry};
use crate::error::Result;
use crate::events::{SubscriptionId, TimelineEvent, TimelineNotifier};
use crate::playback::{PlaybackClock, TickOutcome};
use crate::window::{TransitionSettings, TransitionWindow, TransitionWindowModel};
use egui::Pos2;
use uuid::Uuid;

/// Unique identifier for a preview session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewSessionId(pub Uuid);

impl PreviewSessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PreviewSessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame output of a transition preview
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSample {
    /// Playhead time in seconds
    pub clock_time: f32,
    /// Playhead time over timeline length
    pub normalized_time: f32,
    /// Transition progress in [0, 1]
    pub progress: f32,
    /// Blend curve evaluated at `progress`
    pub blend_weight: f32,
}

/// Transition preview: model, clock, drag controller, curve and notifications
#[derive(Debug)]
pub struct TransitionPreviewSession {
    id: PreviewSessionId,
    model: TransitionWindowModel,
    clock: PlaybackClock,
    drag: TimelineDragController,
    curve: BlendCurve,
    notifier: TimelineNotifier,
    config: PreviewConfig,
    synced_revision: u64,
}

impl TransitionPreviewSession {
    /// Open a session on authored values; the stored duration stays pinned
    pub fn new(window: TransitionWindow, curve: BlendCurve, config: PreviewConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_model(TransitionWindowModel::from_window(window, config), curve, config))
    }

    /// Open a session whose transition duration is derived
    pub fn derived(
        exit_time: f32,
        from_duration: f32,
        to_duration: f32,
        curve: BlendCurve,
        config: PreviewConfig,
    ) -> Result<Self> {
        config.validate()?;
        let model = TransitionWindowModel::with_config(exit_time, from_duration, to_duration, config);
        Ok(Self::from_model(model, curve, config))
    }

    fn from_model(model: TransitionWindowModel, curve: BlendCurve, config: PreviewConfig) -> Self {
        let clock = PlaybackClock::with_config(model.total_duration(), &config);
        let session = Self {
            id: PreviewSessionId::new(),
            synced_revision: model.layout_revision(),
            model,
            clock,
            drag: TimelineDragController::new(),
            curve,
            notifier: TimelineNotifier::new(),
            config,
        };
        tracing::debug!(
            id = ?session.id,
            exit_time = session.model.exit_time(),
            duration = session.model.transition_duration(),
            "Opened transition preview"
        );
        session
    }

    /// Advance playback one frame
    pub fn tick(&mut self, delta_seconds: f32) -> TransitionSample {
        self.sync_clock();
        match self.clock.tick(delta_seconds) {
            TickOutcome::Looped => self.notifier.emit(TimelineEvent::PlaybackLooped),
            TickOutcome::Finished => self.notifier.emit(TimelineEvent::PlaybackFinished),
            TickOutcome::Idle | TickOutcome::Advanced => {}
        }
        self.sample()
    }

    /// Current output without advancing
    pub fn sample(&self) -> TransitionSample {
        let clock_time = self.clock.current_time();
        let progress = self.model.progress(clock_time);
        TransitionSample {
            clock_time,
            normalized_time: self.clock.normalized_time(),
            progress,
            blend_weight: BlendCurveEvaluator::evaluate(&self.curve, progress),
        }
    }

    /// Forward a pointer-down
    pub fn pointer_down(&mut self, pointer: Pos2, geometry: &TrackGeometry) {
        self.sync_clock();
        let events = self.drag.pointer_down(pointer, &mut self.model, &mut self.clock, geometry);
        self.dispatch(events);
    }

    /// Forward a pointer-move
    pub fn pointer_move(&mut self, pointer: Pos2, geometry: &TrackGeometry) {
        let events = self.drag.pointer_move(pointer, &mut self.model, &mut self.clock, geometry);
        self.dispatch(events);
    }

    /// Forward a pointer-up
    pub fn pointer_up(&mut self, pointer: Pos2, geometry: &TrackGeometry) {
        let events = self.drag.pointer_up(pointer, &self.model, geometry);
        self.dispatch(events);
    }

    /// Forward a pointer-leave
    pub fn pointer_leave(&mut self, captured: bool) {
        let events = self.drag.pointer_leave(captured);
        self.dispatch(events);
    }

    /// Set the exit time from an edit field
    pub fn set_exit_time(&mut self, exit_time: f32) -> bool {
        let previous_duration = self.model.transition_duration();
        if !self.model.set_exit_time(exit_time) {
            return false;
        }
        let mut events = vec![TimelineEvent::ExitTimeChanged { exit_time: self.model.exit_time() }];
        events.extend(self.duration_changed(previous_duration));
        self.dispatch(events);
        true
    }

    /// Set the from-state clip duration
    pub fn set_from_duration(&mut self, seconds: f32) -> bool {
        self.upstream_edit(|model| model.set_from_duration(seconds))
    }

    /// Set the to-state clip duration
    pub fn set_to_duration(&mut self, seconds: f32) -> bool {
        self.upstream_edit(|model| model.set_to_duration(seconds))
    }

    /// Set the transition duration from an edit field; it stays pinned
    pub fn set_transition_duration(&mut self, seconds: f32) -> bool {
        self.upstream_edit(|model| model.set_transition_duration(seconds))
    }

    /// Replace the blend curve
    pub fn set_curve(&mut self, curve: BlendCurve) {
        self.curve = curve;
    }

    /// Points for drawing the blend curve
    pub fn curve_polyline(&self) -> Vec<[f32; 2]> {
        BlendCurveEvaluator::sample_polyline(&self.curve, self.config.curve_segments)
    }

    /// Register a notification callback
    pub fn subscribe(&mut self, callback: impl FnMut(&TimelineEvent) + 'static) -> SubscriptionId {
        self.notifier.subscribe(callback)
    }

    /// Remove a notification callback
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Get queued events and clear them
    pub fn take_events(&mut self) -> Vec<TimelineEvent> {
        self.notifier.take_events()
    }

    /// Values to write back to the asset
    pub fn settings(&self) -> TransitionSettings {
        self.model.settings()
    }

    /// Session ID
    pub fn id(&self) -> PreviewSessionId {
        self.id
    }

    /// Timeline model
    pub fn model(&self) -> &TransitionWindowModel {
        &self.model
    }

    /// Playback clock
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Playback clock, for transport controls
    pub fn clock_mut(&mut self) -> &mut PlaybackClock {
        &mut self.clock
    }

    /// Target currently being dragged
    pub fn active_drag(&self) -> DragTarget {
        self.drag.active_target()
    }

    /// Target under the pointer while idle
    pub fn hover(&self) -> DragTarget {
        self.drag.hover()
    }

    /// Blend curve
    pub fn curve(&self) -> &BlendCurve {
        &self.curve
    }

    fn upstream_edit(&mut self, edit: impl FnOnce(&mut TransitionWindowModel) -> bool) -> bool {
        let previous_duration = self.model.transition_duration();
        if !edit(&mut self.model) {
            return false;
        }
        let events = self.duration_changed(previous_duration).into_iter().collect();
        self.dispatch(events);
        true
    }

    /// Duration event, only if the derived duration moved
    fn duration_changed(&self, previous: f32) -> Option<TimelineEvent> {
        let duration = self.model.transition_duration();
        (duration != previous).then_some(TimelineEvent::TransitionDurationChanged { duration })
    }

    fn dispatch(&mut self, events: Vec<TimelineEvent>) {
        self.sync_clock();
        self.notifier.emit_all(events);
    }

    fn sync_clock(&mut self) {
        let revision = self.model.layout_revision();
        if revision != self.synced_revision {
            self.clock.set_duration(self.model.total_duration());
            self.synced_revision = revision;
        }
    }
}

/// Single-state preview: one clip looping on its own clock
#[derive(Debug, Clone)]
pub struct StatePreview {
    clock: PlaybackClock,
}

impl StatePreview {
    /// Preview a clip of `clip_duration` seconds
    pub fn new(clip_duration: f32, config: &PreviewConfig) -> Self {
        let mut clock = PlaybackClock::with_config(clip_duration, config);
        clock.set_looping(true);
        Self { clock }
    }

    /// Advance one frame and return the normalized clip time
    pub fn tick(&mut self, delta_seconds: f32) -> f32 {
        self.clock.tick(delta_seconds);
        self.clock.normalized_time()
    }

    /// Follow a change of the previewed clip
    pub fn set_clip_duration(&mut self, seconds: f32) {
        self.clock.set_duration(seconds);
    }

    /// Playback clock
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Playback clock, for transport controls
    pub fn clock_mut(&mut self) -> &mut PlaybackClock {
        &mut self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Rangef, Rect};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn session() -> TransitionPreviewSession {
        TransitionPreviewSession::derived(0.75, 1.0, 1.0, BlendCurve::linear(), PreviewConfig::default())
            .unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PreviewConfig {
            curve_segments: 0,
            ..PreviewConfig::default()
        };
        assert!(TransitionPreviewSession::derived(0.5, 1.0, 1.0, BlendCurve::linear(), config).is_err());
    }

    #[test]
    fn test_clock_spans_timeline() {
        let session = session();
        assert!((session.clock().duration() - 1.85).abs() < 1e-5);
    }

    #[test]
    fn test_tick_reports_progress_and_weight() {
        let mut session = session();
        session.clock_mut().play();
        let sample = session.tick(0.875);
        assert!((sample.progress - 0.5).abs() < 1e-4);
        assert!((sample.blend_weight - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_edit_resyncs_clock_and_notifies() {
        let mut session = session();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.subscribe(move |event| sink.borrow_mut().push(*event));

        assert!(session.set_from_duration(2.0));
        assert!((session.clock().duration() - 2.6).abs() < 1e-5);
        assert_eq!(seen.borrow().len(), 1);
        assert!(!session.set_from_duration(2.0));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_edit_without_duration_change_is_silent() {
        let mut session = session();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.subscribe(move |event| sink.borrow_mut().push(*event));

        // Longer to-state leaves the 0.25s blend alone but stretches the timeline
        assert!(session.set_to_duration(2.0));
        assert!((session.model().transition_duration() - 0.25).abs() < 1e-5);
        assert!((session.clock().duration() - 2.85).abs() < 1e-5);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_loop_event_is_queued() {
        let mut session = session();
        session.clock_mut().play();
        session.tick(2.0);
        assert_eq!(session.take_events(), vec![TimelineEvent::PlaybackLooped]);
    }

    #[test]
    fn test_drag_through_session() {
        let mut session = session();
        let geometry = TrackGeometry::new(
            Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(185.0, 60.0)),
            Rangef::new(10.0, 20.0),
            Rangef::new(30.0, 40.0),
        );
        session.pointer_down(Pos2::new(75.0, 15.0), &geometry);
        session.pointer_move(Pos2::new(65.0, 15.0), &geometry);
        session.pointer_up(Pos2::new(65.0, 15.0), &geometry);

        assert!((session.settings().exit_time - 0.65).abs() < 1e-4);
        let events = session.take_events();
        assert_eq!(events.first(), Some(&TimelineEvent::DragStarted(DragTarget::ExitTimeHandle)));
        assert_eq!(events.last(), Some(&TimelineEvent::DragEnded(DragTarget::ExitTimeHandle)));
    }

    #[test]
    fn test_sessions_do_not_share_subscribers() {
        let mut a = session();
        let mut b = session();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        a.subscribe(move |_| *counter.borrow_mut() += 1);

        b.set_exit_time(0.5);
        assert_eq!(*count.borrow(), 0);
        a.set_exit_time(0.5);
        assert_eq!(*count.borrow(), 2);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_state_preview_loops() {
        let mut preview = StatePreview::new(2.0, &PreviewConfig::default());
        preview.clock_mut().play();
        assert_eq!(preview.tick(1.0), 0.5);
        assert_eq!(preview.tick(1.5), 0.25);
    }
}
