//! # Bulk-load orchestration and interactive state
//!
//! One bulk load builds the entire data model (observatory, time frame,
//! normalized catalogues, per-catalogue trajectory tensors, constellation
//! lines) and hands it back as an immutable [`Almanac`] that the
//! interactive exploration reads for the rest of the session. There is no
//! incremental update path: a new load tears the previous model down
//! entirely.
//!
//! ## Cancellation
//!
//! [`load_sky`] checks a caller-supplied `should_cancel()` closure between
//! discrete steps. When it fires, the current step finishes, no further step
//! starts and the function returns `Ok(None)`. Already-dispatched position
//! workers are never interrupted mid-batch.
//!
//! ## Failure
//!
//! Any configuration error, load failure or worker failure aborts the whole
//! cycle; no partial catalogue set is ever returned. The retry is always a
//! user-initiated re-run, typically with lighter settings.

use camino::Utf8PathBuf;
use hifitime::Epoch;

use crate::almanac_errors::AlmanacError;
use crate::catalogue::constellations::{Constellations, LINES_FILE};
use crate::catalogue::registry::CatalogueSet;
use crate::constants::Degree;
use crate::observatory::{Observatory, Vantage};
use crate::observe::engine::PositionEngine;
use crate::observe::Viewer;
use crate::timeframes::TimeFrame;

#[cfg(feature = "progress")]
use crate::progress::{fmt_dur, StepTimer};
#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

/// Everything a bulk load needs to know, set once per load cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSettings {
    /// Vantage latitude in degrees, −90..90.
    pub latitude: Degree,
    /// Vantage longitude in degrees, −180..180.
    pub longitude: Degree,
    /// Observation start date; the series anchors at 12:00 UTC on this day.
    pub year: i32,
    pub month: u8,
    pub day: u8,
    /// Number of 24-hour periods to cover, ≥ 1.
    pub days: u32,
    /// Seconds between samples within one day.
    pub sample_rate: u32,
    /// Inclusive magnitude range for the two deep-sky catalogues.
    pub deep_sky_range: (f64, f64),
    /// Inclusive magnitude range for the starfield.
    pub starfield_range: (f64, f64),
    /// Directory holding the catalogue files and the ephemeris dataset.
    pub catalogue_dir: Utf8PathBuf,
}

impl Default for LoadSettings {
    fn default() -> Self {
        // Start from today when the clock is readable.
        let (year, month, day) = Epoch::now()
            .map(|now| {
                let (y, m, d, ..) = now.to_gregorian_utc();
                (y, m, d)
            })
            .unwrap_or((2025, 1, 1));

        LoadSettings {
            latitude: 54.0,
            longitude: 0.0,
            year,
            month,
            day,
            days: 7,
            sample_rate: 600,
            deep_sky_range: (-2.0, 6.0),
            starfield_range: (-2.0, 6.0),
            catalogue_dir: Utf8PathBuf::from("./catalogues"),
        }
    }
}

/// The interactive filter selections, owned by the control layer.
///
/// Single-writer: the control layer mutates it, the query/render path reads
/// it. A render pass working from another thread should `clone()` the state
/// once per redraw and query from the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    /// Selected day offset into the loaded window.
    pub day: usize,
    /// Intra-day start, in samples from 12:00 UTC.
    pub first_sample: usize,
    /// Number of samples in the transit-arc window.
    pub spread: usize,
    /// Altitude range in degrees, inclusive, within 0–90.
    pub alt_range: (Degree, Degree),
    /// Azimuth range in degrees, inclusive; `lo > hi` wraps through north.
    pub az_range: (Degree, Degree),
    pub deep_sky_range: (f64, f64),
    pub starfield_range: (f64, f64),
    /// View rotation in degrees. 270 puts south at the top of a polar plot.
    pub rotation: Degree,
}

impl Default for QueryState {
    fn default() -> Self {
        QueryState {
            day: 0,
            first_sample: 0,
            spread: 6,
            alt_range: (0.0, 90.0),
            az_range: (0.0, 360.0),
            deep_sky_range: (-2.0, 6.0),
            starfield_range: (-2.0, 6.0),
            rotation: 270.0,
        }
    }
}

/// The complete, immutable data model of one exploration session.
#[derive(Debug)]
pub struct Almanac {
    observatory: Observatory,
    frame: TimeFrame,
    viewers: Vec<Viewer>,
    constellations: Constellations,
}

impl Almanac {
    pub fn vantage(&self) -> Vantage {
        self.observatory.vantage()
    }

    pub fn observatory(&self) -> &Observatory {
        &self.observatory
    }

    pub fn frame(&self) -> &TimeFrame {
        &self.frame
    }

    pub fn viewers(&self) -> &[Viewer] {
        &self.viewers
    }

    /// Mutable access for the per-viewer display toggles.
    pub fn viewers_mut(&mut self) -> &mut [Viewer] {
        &mut self.viewers
    }

    pub fn constellations(&self) -> &Constellations {
        &self.constellations
    }

    /// Time mask for the query's selected day and intra-day window.
    ///
    /// A zero spread still selects the single start instant.
    pub fn time_mask(&self, query: &QueryState) -> Vec<bool> {
        self.frame
            .sample_window(query.day, query.first_sample, query.spread.max(1))
    }
}

/// Per-step progress reporting, a no-op unless the `progress` feature is on.
struct LoadProgress {
    #[cfg(feature = "progress")]
    bar: ProgressBar,
    #[cfg(feature = "progress")]
    timer: StepTimer,
}

impl LoadProgress {
    fn new(steps: usize) -> Self {
        #[cfg(feature = "progress")]
        {
            let bar = ProgressBar::new(steps as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} | {msg}")
                    .expect("indicatif template"),
            );
            LoadProgress {
                bar,
                timer: StepTimer::start(),
            }
        }
        #[cfg(not(feature = "progress"))]
        {
            let _ = steps;
            LoadProgress {}
        }
    }

    fn step(&mut self, label: &str) {
        #[cfg(feature = "progress")]
        {
            let dt = self.timer.tick();
            self.bar.set_message(format!("{label} [{}]", fmt_dur(dt)));
            self.bar.inc(1);
        }
        #[cfg(not(feature = "progress"))]
        {
            let _ = label;
        }
    }

    fn finish(self) {
        #[cfg(feature = "progress")]
        self.bar.finish_and_clear();
    }
}

/// Run one bulk-load cycle.
///
/// Arguments
/// -----------------
/// * `settings`: the cycle's configuration.
/// * `should_cancel`: polled between steps; returning true lets the current
///   step finish, starts nothing further and yields `Ok(None)`.
///
/// Return
/// ----------
/// * `Ok(Some(almanac))` on success, `Ok(None)` when cancelled, or the first
///   [`AlmanacError`] encountered; the cycle is all-or-nothing.
pub fn load_sky<F>(
    settings: &LoadSettings,
    mut should_cancel: F,
) -> Result<Option<Almanac>, AlmanacError>
where
    F: FnMut() -> bool,
{
    let mut progress = LoadProgress::new(4 + CatalogueSet::NUM_VIEWERS);

    let vantage = Vantage::new(settings.latitude, settings.longitude)?;
    let observatory = Observatory::new(vantage, &settings.catalogue_dir);
    progress.step("observatory");
    if should_cancel() {
        return Ok(None);
    }

    let frame = TimeFrame::new(
        settings.year,
        settings.month,
        settings.day,
        settings.days,
        settings.sample_rate,
    )?;
    progress.step("time frame");
    if should_cancel() {
        return Ok(None);
    }

    let ephemeris = observatory.ephemeris()?;
    let catalogues = CatalogueSet::load(
        &settings.catalogue_dir,
        ephemeris,
        frame.mjd()[0],
        settings.deep_sky_range,
        settings.starfield_range,
    )?;
    progress.step("catalogues");
    if should_cancel() {
        return Ok(None);
    }

    let engine = PositionEngine::new();
    let mut viewers = Vec::with_capacity(catalogues.len());
    for (descriptor, catalogue) in catalogues.iter() {
        viewers.push(Viewer::observe(
            descriptor,
            catalogue.clone(),
            &engine,
            vantage,
            &frame,
            ephemeris,
        )?);
        progress.step(&format!("{} {} objects", catalogue.len(), descriptor.label));
        if should_cancel() {
            return Ok(None);
        }
    }

    let constellations = Constellations::load(
        &settings.catalogue_dir.join(LINES_FILE),
        catalogues.starfield(),
    )?;
    progress.step("constellations");
    progress.finish();

    Ok(Some(Almanac {
        observatory,
        frame,
        viewers,
        constellations,
    }))
}
