//! # Parallel position engine
//!
//! Computes the apparent position of every catalogue target at every instant
//! of the time series, producing the catalogue's [`TrajectoryTensor`].
//!
//! ## Batching
//!
//! Targets are partitioned into batches of at least [`MIN_BATCH_SIZE`]
//! (or `targets / workers`, whichever is larger) so the per-worker fixed
//! cost is amortized against enough per-target work. One scoped thread runs
//! per batch; the heavy shared state (the per-instant sidereal-time
//! scaffold and the loaded ephemeris) is borrowed read-only by every
//! worker, it is never copied or reloaded. A single batch is computed
//! inline, without touching the pool.
//!
//! Batch results are re-joined in **submission order**: row *i* of the
//! tensor is row *i* of the catalogue no matter which worker computed it or
//! in what wall-clock order it finished. Any worker error or panic aborts
//! the whole catalogue; no partial tensor survives.

use std::thread;

use crate::almanac_errors::AlmanacError;
use crate::catalogue::{Catalogue, CatalogueEntry, TargetKind};
use crate::constants::{Radian, DPI, MIN_BATCH_SIZE, MJD, RADEG};
use crate::ephemeris::SolarEphemeris;
use crate::observatory::Vantage;
use crate::time::gmst;
use crate::timeframes::TimeFrame;

use super::TrajectoryTensor;

/// The fixed-size worker pool the bulk-load cycle computes positions with.
#[derive(Debug, Clone, Copy)]
pub struct PositionEngine {
    workers: usize,
    min_batch: usize,
}

impl Default for PositionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionEngine {
    /// Engine with the stock pool: half the available processors, minimum 1.
    pub fn new() -> Self {
        let cores = thread::available_parallelism().map_or(1, |n| n.get());
        PositionEngine {
            workers: (cores / 2).max(1),
            min_batch: MIN_BATCH_SIZE,
        }
    }

    /// Engine with an explicit pool size and batch floor.
    ///
    /// The stock settings are right for production use; this exists so the
    /// batching itself can be exercised (any worker/batch split must yield a
    /// tensor identical to the single-batch computation).
    pub fn with_pool(workers: usize, min_batch: usize) -> Self {
        PositionEngine {
            workers: workers.max(1),
            min_batch: min_batch.max(1),
        }
    }

    /// Compute the trajectory tensor for one catalogue.
    ///
    /// Arguments
    /// -----------------
    /// * `vantage`: the observation point.
    /// * `catalogue`: targets, in the row order the tensor will preserve.
    /// * `frame`: the instants to sample.
    /// * `ephemeris`: shared body dataset for ephemeris-type targets.
    ///
    /// Return
    /// ----------
    /// * The dense tensor, or [`AlmanacError::ComputeWorker`] /
    ///   [`AlmanacError::UnknownBody`] when any batch fails (the computation
    ///   is all-or-nothing).
    pub fn compute(
        &self,
        vantage: Vantage,
        catalogue: &Catalogue,
        frame: &TimeFrame,
        ephemeris: &SolarEphemeris,
    ) -> Result<TrajectoryTensor, AlmanacError> {
        let entries = catalogue.entries();
        let mjd = frame.mjd();
        // Sidereal-time scaffold, computed once and borrowed by every worker.
        let sidereal: Vec<Radian> = mjd.iter().map(|&m| gmst(m)).collect();

        let chunk = self.min_batch.max(entries.len() / self.workers).max(1);
        let batches: Vec<&[CatalogueEntry]> = entries.chunks(chunk).collect();

        let data = if batches.len() <= 1 {
            compute_batch(vantage, entries, mjd, &sidereal, ephemeris)?
        } else {
            thread::scope(|scope| {
                let handles: Vec<_> = batches
                    .iter()
                    .map(|&batch| {
                        let sidereal = &sidereal;
                        scope.spawn(move || compute_batch(vantage, batch, mjd, sidereal, ephemeris))
                    })
                    .collect();

                // Join in submission order, not completion order, so the
                // concatenation preserves catalogue row order.
                let mut data = Vec::with_capacity(entries.len() * mjd.len() * 2);
                for handle in handles {
                    let part = handle.join().map_err(|_| {
                        AlmanacError::ComputeWorker("position worker panicked".to_string())
                    })??;
                    data.extend_from_slice(&part);
                }
                Ok::<_, AlmanacError>(data)
            })?
        };

        Ok(TrajectoryTensor::new(entries.len(), mjd.len(), data))
    }
}

/// Positions for one batch of targets across the whole time series.
///
/// Returns `[batch_len × instants × 2]` values in batch row order. Star
/// targets reuse their fixed RA/Dec for every instant; ephemeris targets
/// re-resolve their geocentric direction per instant.
fn compute_batch(
    vantage: Vantage,
    batch: &[CatalogueEntry],
    mjd: &[MJD],
    sidereal: &[Radian],
    ephemeris: &SolarEphemeris,
) -> Result<Vec<f32>, AlmanacError> {
    let (sin_lat, cos_lat) = (vantage.latitude * RADEG).sin_cos();
    let lon = vantage.longitude * RADEG;

    let mut out = Vec::with_capacity(batch.len() * mjd.len() * 2);
    for entry in batch {
        match entry.kind {
            TargetKind::Star => {
                let ra = entry.ra_deg * RADEG;
                let (sin_dec, cos_dec) = (entry.dec_deg * RADEG).sin_cos();
                for &theta in sidereal {
                    let hour_angle = theta + lon - ra;
                    push_position(&mut out, sin_lat, cos_lat, sin_dec, cos_dec, hour_angle);
                }
            }
            TargetKind::Ephemeris => {
                let body = entry.id.to_string();
                for (&instant, &theta) in mjd.iter().zip(sidereal) {
                    let (ra_deg, dec_deg) = ephemeris.geocentric_radec(&body, instant)?;
                    let (sin_dec, cos_dec) = (dec_deg * RADEG).sin_cos();
                    let hour_angle = theta + lon - ra_deg * RADEG;
                    push_position(&mut out, sin_lat, cos_lat, sin_dec, cos_dec, hour_angle);
                }
            }
        }
    }
    Ok(out)
}

/// Append `(zenith angle °, azimuth rad)` for one target at one instant.
///
/// Standard equatorial → horizontal transformation with the azimuth measured
/// from north through east.
#[inline]
fn push_position(
    out: &mut Vec<f32>,
    sin_lat: f64,
    cos_lat: f64,
    sin_dec: f64,
    cos_dec: f64,
    hour_angle: Radian,
) {
    let (sin_h, cos_h) = hour_angle.sin_cos();

    let up = sin_dec * sin_lat + cos_dec * cos_h * cos_lat;
    let north = sin_dec * cos_lat - cos_dec * cos_h * sin_lat;
    let east = -cos_dec * sin_h;

    let altitude = up.clamp(-1.0, 1.0).asin() / RADEG;
    let azimuth = east.atan2(north).rem_euclid(DPI);

    out.push((90.0 - altitude) as f32);
    out.push(azimuth as f32);
}
