// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transition timeline preview for `OrdoPlay` Editor.
//!
//! This crate provides the timing core behind state and transition previews:
//! - Playback clock with loop, pause and speed control
//! - Blend curves mapping transition progress to blend weight
//! - Transition window model (exit time, durations, bar layout, progress)
//! - Pointer dragging of the exit-time handle and to-state bar
//!
//! ## Architecture
//!
//! A [`TransitionPreviewSession`] owns one model, one clock, one drag
//! controller and its own notification hub. Sessions share nothing, and
//! everything runs synchronously inside the host's frame update.

pub mod config;
pub mod curve;
pub mod drag;
pub mod error;
pub mod events;
pub mod playback;
pub mod session;
pub mod window;

pub use config::PreviewConfig;
pub use curve::{BlendCurve, BlendCurveEvaluator, CurveInterpolation, CurveKey, CurveSampler};
pub use drag::{
    dragged_exit_time, hit_test, hover_target,
    DragSession, DragState, DragTarget, TimelineDragController, TrackGeometry,
};
pub use error::{PreviewError, Result};
pub use events::{SubscriptionId, TimelineEvent, TimelineNotifier};
pub use playback::{PlaybackClock, PlaybackState, TickOutcome};
pub use session::{PreviewSessionId, StatePreview, TransitionPreviewSession, TransitionSample};
pub use window::{BarLayout, TransitionSettings, TransitionWindow, TransitionWindowModel};
