// SPDX-License-Identifier: MIT OR Apache-2.0
//! Preview mixing for `OrdoPlay` Editor.
//!
//! This crate feeds animation previews from authoring and simulation data:
//! - Rate-limited smoothing of 2D blend-space parameters
//! - Bridging per-frame sampler output into a fixed-size clip mixer
//!
//! Both run once per frame on the render tick and hold no shared state.

pub mod interpolator;
pub mod sampler;

pub use interpolator::{BlendPosition2D, BlendPositionTracker, ParameterInterpolator};
pub use sampler::{
    BridgeReport, ClipMixer, MixerInput, MixerSlot, MixerTarget, SamplerEntry, SamplerWeightBridge,
};
