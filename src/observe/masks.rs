//! # Interactive query masks
//!
//! Read-only mask and slice operations over a computed [`TrajectoryTensor`].
//! Nothing here recomputes geometry: the interactive time, position and
//! magnitude filters are all answered from the tensor
//! built at bulk-load time.
//!
//! Time selection is a contiguous block so it is a **slice**
//! ([`Viewer::altaz_window`]); position and magnitude selections are
//! discontiguous so they are **masks**. The three compose by logical AND,
//! with the per-target magnitude mask broadcast across the time dimension.

use crate::constants::{Degree, RADEG};

use super::{TrajectoryTensor, Viewer};

/// Boolean grid of shape `[targets, instants]` over a (usually
/// time-restricted) tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionalMask {
    targets: usize,
    instants: usize,
    bits: Vec<bool>,
}

impl PositionalMask {
    fn new(targets: usize, instants: usize, bits: Vec<bool>) -> Self {
        debug_assert_eq!(bits.len(), targets * instants);
        PositionalMask {
            targets,
            instants,
            bits,
        }
    }

    pub fn targets(&self) -> usize {
        self.targets
    }

    pub fn instants(&self) -> usize {
        self.instants
    }

    #[inline]
    pub fn get(&self, target: usize, instant: usize) -> bool {
        self.bits[target * self.instants + instant]
    }

    /// Number of `(target, instant)` cells selected.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// AND a per-target vector into the grid, broadcasting it across the
    /// time dimension.
    fn and_targets(mut self, per_target: &[bool]) -> Self {
        debug_assert_eq!(per_target.len(), self.targets);
        for (target, &keep) in per_target.iter().enumerate() {
            if !keep {
                let from = target * self.instants;
                self.bits[from..from + self.instants].fill(false);
            }
        }
        self
    }
}

impl Viewer {
    /// The tensor restricted to the instants marked true in `time_mask`.
    ///
    /// All targets are retained; only the time dimension shrinks. This is the
    /// first step of every interactive query, so later masking works on the
    /// smallest possible slice.
    pub fn altaz_window(&self, time_mask: &[bool]) -> TrajectoryTensor {
        self.tensor.window(time_mask)
    }

    /// Boolean grid marking where each target falls inside both the altitude
    /// and azimuth ranges, over the time-restricted slice.
    ///
    /// Arguments
    /// -----------------
    /// * `time_mask`: instants to consider, from
    ///   [`TimeFrame::sample_window`](crate::timeframes::TimeFrame::sample_window).
    /// * `alt_range`: altitude degrees, inclusive, within 0–90. Altitude is
    ///   stored as its 90-complement so the comparison inverts the range.
    /// * `az_range`: azimuth degrees, inclusive, within 0–360. A range with
    ///   `lo > hi` wraps through north: (350, 10) accepts 355° and 5°.
    pub fn positional_mask(
        &self,
        time_mask: &[bool],
        alt_range: (Degree, Degree),
        az_range: (Degree, Degree),
    ) -> PositionalMask {
        let slice = self.altaz_window(time_mask);

        let zenith_lo = (90.0 - alt_range.1) as f32;
        let zenith_hi = (90.0 - alt_range.0) as f32;
        let az_lo = (az_range.0 * RADEG) as f32;
        let az_hi = (az_range.1 * RADEG) as f32;
        let wraps = az_lo > az_hi;

        let mut bits = Vec::with_capacity(slice.targets() * slice.instants());
        for target in 0..slice.targets() {
            for instant in 0..slice.instants() {
                let zenith = slice.zenith(target, instant);
                let azimuth = slice.azimuth(target, instant);
                let in_alt = zenith >= zenith_lo && zenith <= zenith_hi;
                let in_az = if wraps {
                    azimuth >= az_lo || azimuth <= az_hi
                } else {
                    azimuth >= az_lo && azimuth <= az_hi
                };
                bits.push(in_alt && in_az);
            }
        }
        PositionalMask::new(slice.targets(), slice.instants(), bits)
    }

    /// Per-target mask over the static catalogue magnitudes, time-invariant.
    pub fn magnitude_mask(&self, mag_range: (f64, f64)) -> Vec<bool> {
        self.magnitudes()
            .iter()
            .map(|&m| m >= mag_range.0 && m <= mag_range.1)
            .collect()
    }

    /// All three filters ANDed: which targets, at which selected instants,
    /// pass the positional and magnitude ranges.
    pub fn combined_mask(
        &self,
        time_mask: &[bool],
        alt_range: (Degree, Degree),
        az_range: (Degree, Degree),
        mag_range: (f64, f64),
    ) -> PositionalMask {
        self.positional_mask(time_mask, alt_range, az_range)
            .and_targets(&self.magnitude_mask(mag_range))
    }
}
