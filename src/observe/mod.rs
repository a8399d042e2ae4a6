//! # Position computation and interactive querying
//!
//! The computational core of the crate. [`engine::PositionEngine`] turns one
//! catalogue and one time series into a dense [`TrajectoryTensor`] of
//! apparent positions; a [`Viewer`] pairs that tensor with its catalogue and
//! the display decor the presentation layer consumes; [`masks`] derives
//! boolean masks over the tensor so every interactive filter is answered
//! without recomputing any geometry.
//!
//! The tensor is built once per bulk-load cycle, is never mutated afterwards
//! and may be read concurrently without locking. Memory scales with
//! `targets × instants`; computation time scales with the target count.

use std::time::Instant;

use crate::almanac_errors::AlmanacError;
use crate::catalogue::registry::SourceDescriptor;
use crate::catalogue::Catalogue;
use crate::constants::{Rgb, TargetId};
use crate::ephemeris::SolarEphemeris;
use crate::observatory::Vantage;
use crate::timeframes::TimeFrame;

pub mod engine;
pub mod masks;

use engine::PositionEngine;

/// Dense apparent-position data for one catalogue.
///
/// Shape `[targets, instants, 2]`, row-major, `f32` storage. Component 0 is
/// the **zenith angle** in degrees (90 − altitude, so 0 = zenith and 90 =
/// horizon, which places the zenith at the centre of a radial plot);
/// component 1 is the azimuth in radians, normalized to `[0, 2π)`.
///
/// Row *i* always corresponds to row *i* of the catalogue that produced it,
/// regardless of how the computation was batched.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryTensor {
    targets: usize,
    instants: usize,
    data: Vec<f32>,
}

impl TrajectoryTensor {
    pub(crate) fn new(targets: usize, instants: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), targets * instants * 2);
        TrajectoryTensor {
            targets,
            instants,
            data,
        }
    }

    pub fn targets(&self) -> usize {
        self.targets
    }

    pub fn instants(&self) -> usize {
        self.instants
    }

    /// Zenith angle (90 − altitude) in degrees for `(target, instant)`.
    #[inline]
    pub fn zenith(&self, target: usize, instant: usize) -> f32 {
        self.data[(target * self.instants + instant) * 2]
    }

    /// Azimuth in radians, `[0, 2π)`, for `(target, instant)`.
    #[inline]
    pub fn azimuth(&self, target: usize, instant: usize) -> f32 {
        self.data[(target * self.instants + instant) * 2 + 1]
    }

    /// Restrict the tensor to the instants marked true, all targets retained.
    ///
    /// The mask length must equal the tensor's instant count. The result is a
    /// new tensor; the original is untouched (the time dimension of a query
    /// is always a contiguous block, but the restriction works for any mask).
    pub fn window(&self, time_mask: &[bool]) -> TrajectoryTensor {
        assert_eq!(time_mask.len(), self.instants);
        let selected = time_mask.iter().filter(|&&m| m).count();

        let mut data = Vec::with_capacity(self.targets * selected * 2);
        for target in 0..self.targets {
            for (instant, &keep) in time_mask.iter().enumerate() {
                if keep {
                    let at = (target * self.instants + instant) * 2;
                    data.extend_from_slice(&self.data[at..at + 2]);
                }
            }
        }
        TrajectoryTensor::new(self.targets, selected, data)
    }
}

/// One catalogue paired with its computed trajectory tensor and per-viewer
/// display state.
///
/// The flattened per-target arrays (`names`, `magnitudes`, `sizes`,
/// `colours`) are what the presentation layer consumes directly; they are
/// index-aligned with the tensor rows. Non-starfield viewers paint every
/// object with the source's flat ink colour; the starfield keeps per-object
/// brightness greys.
#[derive(Debug, Clone)]
pub struct Viewer {
    label: &'static str,
    ink: Rgb,
    is_starfield: bool,
    /// Interactive on/off toggle for the whole source.
    pub on_display: bool,
    /// Constellation-overlay toggle. Meaningful only for the starfield
    /// viewer; the overlay is never drawn for any other source.
    pub lines_on_display: bool,
    names: Vec<TargetId>,
    magnitudes: Vec<f64>,
    sizes: Vec<f32>,
    colours: Vec<Rgb>,
    catalogue: Catalogue,
    tensor: TrajectoryTensor,
}

impl Viewer {
    /// Compute the trajectory tensor for one catalogue and assemble the
    /// viewer around it.
    ///
    /// Return
    /// ----------
    /// * The viewer, or the engine's [`AlmanacError`]: a failed worker
    ///   aborts the whole catalogue, no partial tensor is kept.
    pub fn observe(
        descriptor: &SourceDescriptor,
        catalogue: Catalogue,
        engine: &PositionEngine,
        vantage: Vantage,
        frame: &TimeFrame,
        ephemeris: &SolarEphemeris,
    ) -> Result<Self, AlmanacError> {
        let start = Instant::now();
        let tensor = engine.compute(vantage, &catalogue, frame, ephemeris)?;
        eprintln!(
            "[{}] {} targets × {} instants in {:.3}s",
            descriptor.label,
            tensor.targets(),
            tensor.instants(),
            start.elapsed().as_secs_f64()
        );

        let entries = catalogue.entries();
        let names = entries.iter().map(|e| e.id.clone()).collect();
        let magnitudes = entries.iter().map(|e| e.magnitude).collect();
        let sizes = entries.iter().map(|e| e.size).collect();
        let colours = entries
            .iter()
            .map(|e| {
                if descriptor.is_starfield {
                    [e.brightness, e.brightness, e.brightness]
                } else {
                    descriptor.ink
                }
            })
            .collect();

        Ok(Viewer {
            label: descriptor.label,
            ink: descriptor.ink,
            is_starfield: descriptor.is_starfield,
            on_display: true,
            lines_on_display: descriptor.is_starfield,
            names,
            magnitudes,
            sizes,
            colours,
            catalogue,
            tensor,
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn ink(&self) -> Rgb {
        self.ink
    }

    pub fn is_starfield(&self) -> bool {
        self.is_starfield
    }

    pub fn names(&self) -> &[TargetId] {
        &self.names
    }

    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn colours(&self) -> &[Rgb] {
        &self.colours
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn tensor(&self) -> &TrajectoryTensor {
        &self.tensor
    }
}

#[cfg(test)]
mod tensor_test {
    use super::*;

    fn tensor_3x4() -> TrajectoryTensor {
        // data[target][instant] = (10·target + instant, 0.1·instant)
        let mut data = Vec::new();
        for target in 0..3 {
            for instant in 0..4 {
                data.push((10 * target + instant) as f32);
                data.push(0.1 * instant as f32);
            }
        }
        TrajectoryTensor::new(3, 4, data)
    }

    #[test]
    fn test_indexing() {
        let tensor = tensor_3x4();
        assert_eq!(tensor.zenith(2, 3), 23.0);
        assert_eq!(tensor.azimuth(2, 3), 0.3);
        assert_eq!(tensor.zenith(0, 0), 0.0);
    }

    #[test]
    fn test_window_keeps_all_targets() {
        let tensor = tensor_3x4();
        let windowed = tensor.window(&[false, true, true, false]);
        assert_eq!(windowed.targets(), 3);
        assert_eq!(windowed.instants(), 2);
        assert_eq!(windowed.zenith(1, 0), 11.0);
        assert_eq!(windowed.zenith(1, 1), 12.0);
        assert_eq!(windowed.azimuth(2, 1), 0.2);

        // The source tensor is untouched.
        assert_eq!(tensor.instants(), 4);
    }
}
