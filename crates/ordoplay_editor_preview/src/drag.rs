// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer interaction on the transition timeline.
//!
//! Hit-testing and the exit-time drag math are pure functions of the pointer
//! position, the model and the track geometry. [`TimelineDragController`]
//! only keeps the `Idle`/`Dragging` state and the hover highlight.

use crate::events::TimelineEvent;
use crate::playback::PlaybackClock;
use crate::window::{BarLayout, TransitionWindowModel};
use egui::{Pos2, Rangef, Rect};

/// What a pointer is interacting with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragTarget {
    /// Nothing
    #[default]
    None,
    /// The playhead / time ruler
    Scrubber,
    /// The exit-time handle at the start of the to-bar
    ExitTimeHandle,
    /// The to-state bar body
    ToBar,
}

/// An active drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// What is being dragged
    pub target: DragTarget,
    /// Exit time (handle/bar drags) or playhead seconds (scrubbing) at pointer-down
    pub start_value: f32,
    /// Pointer x at pointer-down
    pub start_pointer_x: f32,
}

/// Drag state machine
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// No drag in progress
    #[default]
    Idle,
    /// Dragging
    Dragging(DragSession),
}

/// Where the bars sit on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    /// Track area; its left edge is time zero and its width spans the whole timeline
    pub rect: Rect,
    /// Vertical extent of the from-state bar
    pub from_lane: Rangef,
    /// Vertical extent of the to-state bar
    pub to_lane: Rangef,
}

impl TrackGeometry {
    /// Create track geometry
    pub fn new(rect: Rect, from_lane: Rangef, to_lane: Rangef) -> Self {
        Self { rect, from_lane, to_lane }
    }

    /// Track width in pixels
    pub fn width(&self) -> f32 {
        self.rect.width()
    }

    /// Screen x of the exit-time handle
    pub fn exit_handle_x(&self, layout: &BarLayout) -> f32 {
        self.rect.min.x + layout.to_bar_start_px
    }

    /// Screen rect of the to-state bar
    pub fn to_bar_rect(&self, layout: &BarLayout) -> Rect {
        Rect::from_x_y_ranges(
            self.rect.min.x + layout.to_bar_start_px..=self.rect.min.x + layout.to_bar_end_px(),
            self.to_lane,
        )
    }

    /// Timeline seconds under screen x, clamped to the timeline
    pub fn time_at(&self, x: f32, model: &TransitionWindowModel) -> f32 {
        let pps = model.pixels_per_second(self.width());
        if pps <= 0.0 {
            return 0.0;
        }
        ((x - self.rect.min.x) / pps).clamp(0.0, model.total_duration())
    }
}

/// Target under the pointer for highlighting; never returns `Scrubber`
pub fn hover_target(pointer: Pos2, model: &TransitionWindowModel, geometry: &TrackGeometry) -> DragTarget {
    let config = model.config();
    let layout = model.bar_layout(geometry.width());

    let near_handle =
        (pointer.x - geometry.exit_handle_x(&layout)).abs() <= config.handle_tolerance_px;
    let in_from_lane = pointer.y >= geometry.from_lane.min - config.lane_tolerance_px
        && pointer.y <= geometry.from_lane.max + config.lane_tolerance_px;

    // Handle wins over the bar when both are hit
    if near_handle && in_from_lane {
        DragTarget::ExitTimeHandle
    } else if geometry.to_bar_rect(&layout).contains(pointer) {
        DragTarget::ToBar
    } else {
        DragTarget::None
    }
}

/// Target a pointer-down at `pointer` would start dragging
pub fn hit_test(pointer: Pos2, model: &TransitionWindowModel, geometry: &TrackGeometry) -> DragTarget {
    match hover_target(pointer, model, geometry) {
        DragTarget::None => DragTarget::Scrubber,
        target => target,
    }
}

/// Exit time after dragging `delta_px` from `start_exit_time`
pub fn dragged_exit_time(
    start_exit_time: f32,
    from_duration: f32,
    delta_px: f32,
    pixels_per_second: f32,
    min: f32,
    max: f32,
) -> f32 {
    let delta_seconds = delta_px / pixels_per_second;
    ((start_exit_time * from_duration + delta_seconds) / from_duration).clamp(min, max)
}

/// Pointer state machine for the transition timeline
#[derive(Debug, Clone, Default)]
pub struct TimelineDragController {
    state: DragState,
    hover: DragTarget,
}

impl TimelineDragController {
    /// Create an idle controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Current drag state
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Target being dragged, or `None`
    pub fn active_target(&self) -> DragTarget {
        match self.state {
            DragState::Idle => DragTarget::None,
            DragState::Dragging(session) => session.target,
        }
    }

    /// Is a drag in progress
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Highlighted target while idle
    pub fn hover(&self) -> DragTarget {
        self.hover
    }

    /// Start a drag session
    pub fn pointer_down(
        &mut self,
        pointer: Pos2,
        model: &mut TransitionWindowModel,
        clock: &mut PlaybackClock,
        geometry: &TrackGeometry,
    ) -> Vec<TimelineEvent> {
        if self.is_dragging() {
            return Vec::new();
        }

        let target = hit_test(pointer, model, geometry);
        let start_value = match target {
            DragTarget::Scrubber => geometry.time_at(pointer.x, model),
            _ => model.exit_time(),
        };
        self.state = DragState::Dragging(DragSession {
            target,
            start_value,
            start_pointer_x: pointer.x,
        });
        self.hover = DragTarget::None;
        tracing::debug!(drag_target = ?target, x = pointer.x, "Timeline drag started");

        let mut events = vec![TimelineEvent::DragStarted(target)];
        if target == DragTarget::Scrubber {
            events.push(scrub(pointer, model, clock, geometry));
        }
        events
    }

    /// Continue a drag, or update the hover highlight while idle
    pub fn pointer_move(
        &mut self,
        pointer: Pos2,
        model: &mut TransitionWindowModel,
        clock: &mut PlaybackClock,
        geometry: &TrackGeometry,
    ) -> Vec<TimelineEvent> {
        let DragState::Dragging(session) = self.state else {
            self.hover = hover_target(pointer, model, geometry);
            return Vec::new();
        };

        match session.target {
            DragTarget::Scrubber => vec![scrub(pointer, model, clock, geometry)],
            DragTarget::ExitTimeHandle | DragTarget::ToBar => {
                drag_exit_time(&session, pointer, model, clock, geometry)
            }
            DragTarget::None => Vec::new(),
        }
    }

    /// End the drag
    pub fn pointer_up(
        &mut self,
        pointer: Pos2,
        model: &TransitionWindowModel,
        geometry: &TrackGeometry,
    ) -> Vec<TimelineEvent> {
        let events = self.release();
        self.hover = hover_target(pointer, model, geometry);
        events
    }

    /// Pointer left the track; a captured pointer keeps its drag alive
    pub fn pointer_leave(&mut self, captured: bool) -> Vec<TimelineEvent> {
        self.hover = DragTarget::None;
        if captured {
            return Vec::new();
        }
        self.release()
    }

    fn release(&mut self) -> Vec<TimelineEvent> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => Vec::new(),
            DragState::Dragging(session) => {
                tracing::debug!(drag_target = ?session.target, "Timeline drag ended");
                vec![TimelineEvent::DragEnded(session.target)]
            }
        }
    }
}

fn scrub(
    pointer: Pos2,
    model: &TransitionWindowModel,
    clock: &mut PlaybackClock,
    geometry: &TrackGeometry,
) -> TimelineEvent {
    clock.seek_seconds(geometry.time_at(pointer.x, model));
    TimelineEvent::Scrubbed { time: clock.current_time() }
}

fn drag_exit_time(
    session: &DragSession,
    pointer: Pos2,
    model: &mut TransitionWindowModel,
    clock: &mut PlaybackClock,
    geometry: &TrackGeometry,
) -> Vec<TimelineEvent> {
    let config = *model.config();
    let pps = model.pixels_per_second(geometry.width());
    let from_duration = model.from_duration();
    if pps <= 0.0 || from_duration <= config.duration_epsilon {
        return Vec::new();
    }

    let exit_time = dragged_exit_time(
        session.start_value,
        from_duration,
        pointer.x - session.start_pointer_x,
        pps,
        config.drag_exit_time_min,
        config.drag_exit_time_max,
    );
    let previous_duration = model.transition_duration();
    if !model.set_exit_time(exit_time) {
        return Vec::new();
    }

    clock.set_duration(model.total_duration());
    let mut events = vec![TimelineEvent::ExitTimeChanged { exit_time: model.exit_time() }];
    if model.transition_duration() != previous_duration {
        events.push(TimelineEvent::TransitionDurationChanged {
            duration: model.transition_duration(),
        });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1.0s + 1.0s at exit 0.75: total 1.85s, so 185px gives 100px per second
    fn setup() -> (TransitionWindowModel, PlaybackClock, TrackGeometry) {
        let model = TransitionWindowModel::new(0.75, 1.0, 1.0);
        let clock = PlaybackClock::new(model.total_duration());
        let geometry = TrackGeometry::new(
            Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(185.0, 60.0)),
            Rangef::new(10.0, 20.0),
            Rangef::new(30.0, 40.0),
        );
        (model, clock, geometry)
    }

    #[test]
    fn test_hit_test_exit_handle() {
        let (model, _, geometry) = setup();
        assert_eq!(hit_test(Pos2::new(75.0, 15.0), &model, &geometry), DragTarget::ExitTimeHandle);
        assert_eq!(hit_test(Pos2::new(84.0, 6.0), &model, &geometry), DragTarget::ExitTimeHandle);
        assert_eq!(hit_test(Pos2::new(86.0, 15.0), &model, &geometry), DragTarget::Scrubber);
    }

    #[test]
    fn test_hit_test_to_bar_and_scrubber() {
        let (model, _, geometry) = setup();
        assert_eq!(hit_test(Pos2::new(120.0, 35.0), &model, &geometry), DragTarget::ToBar);
        assert_eq!(hit_test(Pos2::new(40.0, 35.0), &model, &geometry), DragTarget::Scrubber);
        assert_eq!(hit_test(Pos2::new(120.0, 50.0), &model, &geometry), DragTarget::Scrubber);
    }

    #[test]
    fn test_handle_takes_priority_over_to_bar() {
        let (model, _, geometry) = setup();
        // Lanes overlap here so one point is inside both hit areas
        let geometry = TrackGeometry {
            to_lane: Rangef::new(10.0, 40.0),
            ..geometry
        };
        let pointer = Pos2::new(80.0, 15.0);
        assert!(geometry.to_bar_rect(&model.bar_layout(185.0)).contains(pointer));
        assert_eq!(hit_test(pointer, &model, &geometry), DragTarget::ExitTimeHandle);
    }

    #[test]
    fn test_scrub_seeks_clock_without_touching_model() {
        let (mut model, mut clock, geometry) = setup();
        let mut controller = TimelineDragController::new();
        let revision = model.layout_revision();

        let events = controller.pointer_down(Pos2::new(50.0, 50.0), &mut model, &mut clock, &geometry);
        assert_eq!(controller.active_target(), DragTarget::Scrubber);
        assert_eq!(events[0], TimelineEvent::DragStarted(DragTarget::Scrubber));
        assert!((clock.current_time() - 0.5).abs() < 1e-4);

        controller.pointer_move(Pos2::new(100.0, 50.0), &mut model, &mut clock, &geometry);
        assert!((clock.current_time() - 1.0).abs() < 1e-4);
        assert_eq!(model.layout_revision(), revision);
    }

    #[test]
    fn test_dragging_exit_handle_updates_model() {
        let (mut model, mut clock, geometry) = setup();
        let mut controller = TimelineDragController::new();

        controller.pointer_down(Pos2::new(75.0, 15.0), &mut model, &mut clock, &geometry);
        assert_eq!(controller.active_target(), DragTarget::ExitTimeHandle);

        let events = controller.pointer_move(Pos2::new(55.0, 15.0), &mut model, &mut clock, &geometry);
        assert!((model.exit_time() - 0.55).abs() < 1e-4);
        assert!((model.transition_duration() - 0.45).abs() < 1e-4);
        assert!((clock.duration() - model.total_duration()).abs() < 1e-6);
        assert!(matches!(events[0], TimelineEvent::ExitTimeChanged { .. }));
        assert!(matches!(events[1], TimelineEvent::TransitionDurationChanged { .. }));

        let events = controller.pointer_up(Pos2::new(55.0, 15.0), &model, &geometry);
        assert_eq!(events, vec![TimelineEvent::DragEnded(DragTarget::ExitTimeHandle)]);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_unchanged_duration_is_not_reported() {
        // Short to-state: duration stays at the 0.01s floor wherever the exit is
        let mut model = TransitionWindowModel::new(0.6, 1.0, 0.005);
        let mut clock = PlaybackClock::new(model.total_duration());
        let geometry = TrackGeometry::new(
            Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(110.0, 60.0)),
            Rangef::new(10.0, 20.0),
            Rangef::new(30.0, 40.0),
        );
        let mut controller = TimelineDragController::new();
        controller.pointer_down(Pos2::new(60.0, 15.0), &mut model, &mut clock, &geometry);
        assert_eq!(controller.active_target(), DragTarget::ExitTimeHandle);

        let before = model.transition_duration();
        let events = controller.pointer_move(Pos2::new(61.0, 15.0), &mut model, &mut clock, &geometry);
        assert_eq!(model.transition_duration(), before);
        assert!((model.exit_time() - 0.61).abs() < 1e-4);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], TimelineEvent::ExitTimeChanged { .. }));
    }

    #[test]
    fn test_drag_clamps_exit_time() {
        let (mut model, mut clock, geometry) = setup();
        let mut controller = TimelineDragController::new();

        controller.pointer_down(Pos2::new(120.0, 35.0), &mut model, &mut clock, &geometry);
        assert_eq!(controller.active_target(), DragTarget::ToBar);
        controller.pointer_move(Pos2::new(-500.0, 35.0), &mut model, &mut clock, &geometry);
        assert!((model.exit_time() - 0.05).abs() < 1e-6);
        controller.pointer_move(Pos2::new(900.0, 35.0), &mut model, &mut clock, &geometry);
        assert!((model.exit_time() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_tiny_pointer_moves_do_not_edit() {
        let (mut model, mut clock, geometry) = setup();
        let mut controller = TimelineDragController::new();
        controller.pointer_down(Pos2::new(75.0, 15.0), &mut model, &mut clock, &geometry);
        let revision = model.layout_revision();

        let events = controller.pointer_move(Pos2::new(75.001, 15.0), &mut model, &mut clock, &geometry);
        assert!(events.is_empty());
        assert_eq!(model.layout_revision(), revision);
    }

    #[test]
    fn test_pointer_leave_respects_capture() {
        let (mut model, mut clock, geometry) = setup();
        let mut controller = TimelineDragController::new();
        controller.pointer_down(Pos2::new(75.0, 15.0), &mut model, &mut clock, &geometry);

        assert!(controller.pointer_leave(true).is_empty());
        assert!(controller.is_dragging());
        assert_eq!(
            controller.pointer_leave(false),
            vec![TimelineEvent::DragEnded(DragTarget::ExitTimeHandle)]
        );
        assert_eq!(controller.state(), DragState::Idle);
    }

    #[test]
    fn test_hover_is_independent_of_drag() {
        let (mut model, mut clock, geometry) = setup();
        let mut controller = TimelineDragController::new();

        controller.pointer_move(Pos2::new(120.0, 35.0), &mut model, &mut clock, &geometry);
        assert_eq!(controller.hover(), DragTarget::ToBar);
        assert!(!controller.is_dragging());

        controller.pointer_down(Pos2::new(20.0, 50.0), &mut model, &mut clock, &geometry);
        assert_eq!(controller.hover(), DragTarget::None);
        controller.pointer_move(Pos2::new(120.0, 35.0), &mut model, &mut clock, &geometry);
        assert_eq!(controller.active_target(), DragTarget::Scrubber);
        assert_eq!(controller.hover(), DragTarget::None);

        controller.pointer_up(Pos2::new(75.0, 15.0), &model, &geometry);
        assert_eq!(controller.hover(), DragTarget::ExitTimeHandle);
    }

    #[test]
    fn test_second_pointer_down_is_ignored() {
        let (mut model, mut clock, geometry) = setup();
        let mut controller = TimelineDragController::new();
        controller.pointer_down(Pos2::new(75.0, 15.0), &mut model, &mut clock, &geometry);
        let events = controller.pointer_down(Pos2::new(20.0, 50.0), &mut model, &mut clock, &geometry);
        assert!(events.is_empty());
        assert_eq!(controller.active_target(), DragTarget::ExitTimeHandle);
    }

    #[test]
    fn test_degenerate_from_duration_blocks_exit_drag() {
        let (_, mut clock, geometry) = setup();
        let mut model = TransitionWindowModel::new(0.5, 0.0, 1.0);
        let mut controller = TimelineDragController::new();
        let handle_x = geometry.exit_handle_x(&model.bar_layout(geometry.width()));

        controller.pointer_down(Pos2::new(handle_x, 15.0), &mut model, &mut clock, &geometry);
        assert_eq!(controller.active_target(), DragTarget::ExitTimeHandle);
        let events = controller.pointer_move(Pos2::new(handle_x + 40.0, 15.0), &mut model, &mut clock, &geometry);
        assert!(events.is_empty());
        assert_eq!(model.exit_time(), 0.5);
    }

    #[test]
    fn test_dragged_exit_time_math() {
        assert!((dragged_exit_time(0.5, 2.0, 50.0, 100.0, 0.05, 0.95) - 0.75).abs() < 1e-6);
        assert_eq!(dragged_exit_time(0.5, 2.0, 500.0, 100.0, 0.05, 0.95), 0.95);
    }
}
