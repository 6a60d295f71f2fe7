// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bridge from simulation sampler output to per-clip mixer inputs.
//!
//! The simulation produces a variable-length list of samples each frame. The
//! renderer owns a fixed-size mixer with one input per clip. Every frame the
//! mixer weights are zeroed and then the samples are written in order, so a
//! clip nobody sampled this frame drops out instead of keeping a stale weight.

use serde::{Deserialize, Serialize};

/// One clip sample produced by the simulation for this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplerEntry {
    /// Clip slot; negative values are producer placeholders
    pub clip_index: i32,
    /// Playhead within the clip (seconds)
    pub time: f32,
    /// Blend weight in [0, 1]
    pub weight: f32,
}

impl SamplerEntry {
    /// Create a sampler entry
    pub fn new(clip_index: i32, time: f32, weight: f32) -> Self {
        Self { clip_index, time, weight }
    }
}

/// Weight and playhead of one mixer input
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MixerInput {
    /// Blend weight
    pub weight: f32,
    /// Playhead (seconds)
    pub time: f32,
}

/// A fixed-size per-clip mixer the bridge can drive
pub trait MixerTarget {
    /// Number of inputs
    fn input_count(&self) -> usize;

    /// Whether input `index` has a clip behind it
    fn has_clip(&self, index: usize) -> bool;

    /// Set the weight of input `index`
    fn set_input_weight(&mut self, index: usize, weight: f32);

    /// Set the playhead of input `index`
    fn set_input_time(&mut self, index: usize, time: f32);
}

/// One mixer slot
#[derive(Debug, Clone, PartialEq)]
pub struct MixerSlot<C> {
    /// Clip bound to this slot, if any
    pub clip: Option<C>,
    /// Current input values
    pub input: MixerInput,
}

/// Mixer with one slot per clip, generic over the clip handle type
#[derive(Debug, Clone, PartialEq)]
pub struct ClipMixer<C> {
    slots: Vec<MixerSlot<C>>,
}

impl<C> ClipMixer<C> {
    /// Create a mixer from clip handles; `None` leaves an empty slot
    pub fn new(clips: impl IntoIterator<Item = Option<C>>) -> Self {
        Self {
            slots: clips
                .into_iter()
                .map(|clip| MixerSlot {
                    clip,
                    input: MixerInput::default(),
                })
                .collect(),
        }
    }

    /// Input values of slot `index`
    pub fn input(&self, index: usize) -> Option<MixerInput> {
        self.slots.get(index).map(|slot| slot.input)
    }

    /// Clip bound to slot `index`
    pub fn clip(&self, index: usize) -> Option<&C> {
        self.slots.get(index)?.clip.as_ref()
    }

    /// Replace the clip in slot `index`; out-of-range indices are ignored
    pub fn set_clip(&mut self, index: usize, clip: Option<C>) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.clip = clip;
        }
    }

    /// All slots
    pub fn slots(&self) -> &[MixerSlot<C>] {
        &self.slots
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> f32 {
        self.slots.iter().map(|s| s.input.weight).sum()
    }

    /// Indices of slots with a non-zero weight
    pub fn active_inputs(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.input.weight > 0.0)
            .map(|(i, _)| i)
    }
}

impl<C> MixerTarget for ClipMixer<C> {
    fn input_count(&self) -> usize {
        self.slots.len()
    }

    fn has_clip(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.clip.is_some())
    }

    fn set_input_weight(&mut self, index: usize, weight: f32) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.input.weight = weight;
        }
    }

    fn set_input_time(&mut self, index: usize, time: f32) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.input.time = time;
        }
    }
}

/// Counts from one bridge application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeReport {
    /// Entries written to the mixer
    pub applied: usize,
    /// Entries dropped for a bad index or empty slot
    pub skipped: usize,
}

/// Writes sampler entries into a mixer
pub struct SamplerWeightBridge;

impl SamplerWeightBridge {
    /// Zero every weight, then apply `entries` in order; the last entry for a clip wins
    pub fn apply<M: MixerTarget + ?Sized>(mixer: &mut M, entries: &[SamplerEntry]) -> BridgeReport {
        for index in 0..mixer.input_count() {
            mixer.set_input_weight(index, 0.0);
        }

        let mut report = BridgeReport::default();
        for entry in entries {
            let index = match usize::try_from(entry.clip_index) {
                Ok(index) if index < mixer.input_count() && mixer.has_clip(index) => index,
                _ => {
                    tracing::trace!(clip_index = entry.clip_index, "Skipping sampler entry");
                    report.skipped += 1;
                    continue;
                }
            };

            mixer.set_input_weight(index, sanitize_weight(entry.weight));
            mixer.set_input_time(index, sanitize_time(entry.time));
            report.applied += 1;
        }
        report
    }
}

fn sanitize_time(time: f32) -> f32 {
    if time.is_finite() {
        time
    } else {
        0.0
    }
}

fn sanitize_weight(weight: f32) -> f32 {
    if weight.is_finite() {
        weight.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
