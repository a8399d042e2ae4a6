//! # Time-series builder
//!
//! A [`TimeFrame`] is the fixed-cadence sequence of instants over which every
//! target position is computed. It is anchored at **12:00 UTC** on the start
//! date and spans to 12:00 UTC on `start + days`, with
//! `days × floor(86400 / sample_rate)` evenly spaced samples including both
//! endpoints. All computation is UTC; there is no timezone handling.
//!
//! The frame is immutable once built. [`TimeFrame::sample_window`] derives
//! boolean masks over it for the interactive time-window queries, so the
//! position data itself is never recomputed.

use hifitime::{Duration, Epoch, TimeScale};

use crate::almanac_errors::AlmanacError;
use crate::constants::{MJD, SECONDS_PER_DAY};

/// A strictly increasing, fixed-cadence sequence of UTC instants.
#[derive(Debug, Clone)]
pub struct TimeFrame {
    days: u32,
    sample_rate: u32,
    samples_per_day: usize,
    epochs: Vec<Epoch>,
    mjd: Vec<MJD>,
}

impl TimeFrame {
    /// Build the observation time series.
    ///
    /// Arguments
    /// -----------------
    /// * `year`, `month`, `day`: start date; the series is anchored at
    ///   12:00 UTC on this date.
    /// * `days`: number of 24-hour periods to cover (≥ 1).
    /// * `sample_rate`: seconds between samples within one day. Rates that do
    ///   not divide a day evenly are floored (`samples_per_day =
    ///   86400 / sample_rate`); a rate yielding zero samples per day is a
    ///   configuration error, not a silent truncation.
    ///
    /// Return
    /// ----------
    /// * The immutable [`TimeFrame`], or [`AlmanacError::InvalidTimeFrame`]
    ///   for degenerate input.
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        days: u32,
        sample_rate: u32,
    ) -> Result<Self, AlmanacError> {
        if days == 0 {
            return Err(AlmanacError::InvalidTimeFrame(
                "day count must be at least 1".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(AlmanacError::InvalidTimeFrame(
                "sample rate must be at least 1 second".to_string(),
            ));
        }
        let samples_per_day = (SECONDS_PER_DAY as u32 / sample_rate) as usize;
        if samples_per_day == 0 {
            return Err(AlmanacError::InvalidTimeFrame(format!(
                "sample rate {sample_rate}s yields no samples within a day"
            )));
        }

        let tether = Epoch::maybe_from_gregorian(year, month, day, 12, 0, 0, 0, TimeScale::UTC)
            .map_err(|e| AlmanacError::InvalidTimeFrame(format!("invalid start date: {e}")))?;

        let total = samples_per_day * days as usize;
        let span_s = days as f64 * SECONDS_PER_DAY;

        // Evenly spaced from noon to noon with both endpoints included.
        let mut epochs = Vec::with_capacity(total);
        let mut mjd = Vec::with_capacity(total);
        for i in 0..total {
            let offset = if total > 1 {
                span_s * i as f64 / (total - 1) as f64
            } else {
                0.0
            };
            let epoch = tether + Duration::from_seconds(offset);
            epochs.push(epoch);
            mjd.push(epoch.to_mjd_utc_days());
        }

        eprintln!(
            "Observation window: {tether} .. {} with {total} samples at rate {sample_rate}s for {days}d",
            epochs[total - 1]
        );

        Ok(TimeFrame {
            days,
            sample_rate,
            samples_per_day,
            epochs,
            mjd,
        })
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples_per_day(&self) -> usize {
        self.samples_per_day
    }

    pub fn epochs(&self) -> &[Epoch] {
        &self.epochs
    }

    /// Modified Julian Date (UTC) of every instant, in series order.
    pub fn mjd(&self) -> &[MJD] {
        &self.mjd
    }

    /// Boolean mask selecting a contiguous block of samples within one day.
    ///
    /// The true region is `[day × samples_per_day + first, + count)`, clamped
    /// to the series length: an out-of-range request produces a shorter (or
    /// empty) true region rather than an error. There is no wraparound across
    /// day boundaries.
    pub fn sample_window(&self, day: usize, first: usize, count: usize) -> Vec<bool> {
        let mut mask = vec![false; self.len()];
        let offset = day * self.samples_per_day + first;
        let end = offset.saturating_add(count).min(self.len());
        for slot in mask.iter_mut().take(end).skip(offset.min(self.len())) {
            *slot = true;
        }
        mask
    }
}
