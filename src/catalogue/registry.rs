//! # Catalogue registry
//!
//! The fixed set of data sources, declared as a registration table of
//! [`SourceDescriptor`]s rather than scattered conditionals: adding a source
//! means adding one descriptor. Each descriptor names the file, delimiter and
//! column mapping the normalizer needs, plus the display decor (ink colour,
//! starfield flag) the presentation layer consumes.
//!
//! The ephemeris-body source has no file: its rows are synthesized from the
//! loaded [`SolarEphemeris`] at the first instant of the observation window,
//! with a constant placeholder magnitude (true apparent magnitudes are not
//! computed for solar-system bodies).
//!
//! Error policy: any source failing to load or normalize aborts the whole
//! bulk-load cycle; no partial catalogue set is ever produced.

use camino::Utf8Path;

use crate::almanac_errors::AlmanacError;
use crate::constants::{Rgb, TargetId, EPHEMERIS_MAGNITUDE, MJD};
use crate::ephemeris::SolarEphemeris;

use super::table::Table;
use super::{Catalogue, ColumnSpec, CoordKind, TargetKind};

/// Ephemeris bodies observed by the planet catalogue, in plot order.
pub const EPHEMERIS_BODIES: [&str; 9] = [
    "neptune barycenter",
    "uranus barycenter",
    "saturn barycenter",
    "jupiter barycenter",
    "mars",
    "venus",
    "mercury",
    "sun",
    "moon",
];

/// One registered data source: file and column mapping for the normalizer,
/// display decor for the presentation layer.
#[derive(Debug, Clone, Copy)]
pub struct SourceDescriptor {
    pub label: &'static str,
    file: Option<&'static str>,
    delimiter: u8,
    spec: ColumnSpec<'static>,
    /// Flat display colour for every object of the source.
    pub ink: Rgb,
    /// The one source drawn with per-object brightness instead of `ink`,
    /// and the only one supporting the constellation overlay.
    pub is_starfield: bool,
    /// Filtered by the deep-sky magnitude range rather than the starfield one.
    deep_sky: bool,
}

static SOURCES: [SourceDescriptor; 4] = [
    SourceDescriptor {
        label: "PLANET",
        file: None,
        delimiter: b',',
        spec: ColumnSpec {
            id: "name",
            ra: "ra_deg",
            ra_kind: CoordKind::Degrees,
            dec: "dec_deg",
            dec_kind: CoordKind::Degrees,
            magnitude: "magnitude",
        },
        ink: [0.0, 0.5, 1.0],
        is_starfield: false,
        deep_sky: false,
    },
    SourceDescriptor {
        label: "STAR",
        file: Some("v50.csv"),
        delimiter: b',',
        spec: ColumnSpec {
            id: "HR",
            ra: "RAJ2000",
            ra_kind: CoordKind::Sexagesimal,
            dec: "DEJ2000",
            dec_kind: CoordKind::Sexagesimal,
            magnitude: "Vmag",
        },
        ink: [1.0, 1.0, 1.0],
        is_starfield: true,
        deep_sky: false,
    },
    SourceDescriptor {
        label: "MDSO",
        file: Some("catalogue-de-messier.csv"),
        delimiter: b';',
        spec: ColumnSpec {
            id: "Messier",
            ra: "RA (Right Ascension)",
            ra_kind: CoordKind::Sexagesimal,
            dec: "Dec (Declinaison)",
            dec_kind: CoordKind::Sexagesimal,
            magnitude: "Magnitude",
        },
        ink: [1.0, 0.0, 0.0],
        is_starfield: false,
        deep_sky: true,
    },
    SourceDescriptor {
        label: "NDSO",
        file: Some("ngc2000.csv"),
        delimiter: b';',
        spec: ColumnSpec {
            id: "Name",
            ra: "ra",
            ra_kind: CoordKind::Sexagesimal,
            dec: "dec",
            dec_kind: CoordKind::Sexagesimal,
            magnitude: "Magnitude",
        },
        ink: [1.0, 0.2, 1.0],
        is_starfield: false,
        deep_sky: true,
    },
];

/// The four normalized catalogues of one bulk-load cycle, in source order.
#[derive(Debug, Clone)]
pub struct CatalogueSet {
    catalogues: Vec<Catalogue>,
}

impl CatalogueSet {
    /// Number of viewers a bulk load produces, known before loading starts.
    pub const NUM_VIEWERS: usize = SOURCES.len();

    /// The static source registration table, in load/plot order.
    pub fn sources() -> &'static [SourceDescriptor] {
        &SOURCES
    }

    /// Load and normalize every registered source.
    ///
    /// Arguments
    /// -----------------
    /// * `dir`: catalogue directory holding the source files.
    /// * `ephemeris`: loaded body dataset for the planet source.
    /// * `first_instant`: MJD at which planet RA/Dec rows are sampled.
    /// * `deep_sky_range` / `starfield_range`: inclusive magnitude ranges.
    ///
    /// Return
    /// ----------
    /// * The full set, or the first [`AlmanacError`] encountered (the whole
    ///   cycle aborts; there is no partial set).
    pub fn load(
        dir: &Utf8Path,
        ephemeris: &SolarEphemeris,
        first_instant: MJD,
        deep_sky_range: (f64, f64),
        starfield_range: (f64, f64),
    ) -> Result<Self, AlmanacError> {
        let mut catalogues = Vec::with_capacity(SOURCES.len());
        for source in &SOURCES {
            let catalogue = match source.file {
                None => ephemeris_catalogue(source, ephemeris, first_instant)?,
                Some(file) => {
                    let range = if source.deep_sky {
                        deep_sky_range
                    } else {
                        starfield_range
                    };
                    let table = Table::from_csv_path(&dir.join(file), source.delimiter)?;
                    Catalogue::normalize(source.label, &table, &source.spec, range, TargetKind::Star)?
                }
            };
            catalogues.push(catalogue);
        }
        Ok(CatalogueSet { catalogues })
    }

    pub fn len(&self) -> usize {
        self.catalogues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogues.is_empty()
    }

    /// `(descriptor, catalogue)` pairs in load order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static SourceDescriptor, &Catalogue)> {
        SOURCES.iter().zip(self.catalogues.iter())
    }

    /// The starfield catalogue (the constellation overlay cross-references it).
    pub fn starfield(&self) -> &Catalogue {
        let index = SOURCES
            .iter()
            .position(|s| s.is_starfield)
            .expect("registry declares exactly one starfield source");
        &self.catalogues[index]
    }
}

/// Synthesize the planet catalogue from the ephemeris.
///
/// Bodies are observed once at `first_instant` to extract RA/Dec; magnitude
/// is the [`EPHEMERIS_MAGNITUDE`] placeholder. Bodies absent from the dataset
/// are skipped with a warning, mirroring how a truncated ephemeris file
/// behaves. Display sizes are fixed per body class (sun and moon plotted
/// larger) rather than derived from the placeholder magnitude.
fn ephemeris_catalogue(
    source: &SourceDescriptor,
    ephemeris: &SolarEphemeris,
    first_instant: MJD,
) -> Result<Catalogue, AlmanacError> {
    let mut rows = Vec::with_capacity(EPHEMERIS_BODIES.len());
    for &body in &EPHEMERIS_BODIES {
        if !ephemeris.has_body(body) {
            eprintln!("[{}] body not in ephemeris, skipped: {body}", source.label);
            continue;
        }
        let (ra_deg, dec_deg) = ephemeris.geocentric_radec(body, first_instant)?;
        rows.push(vec![
            body.to_string(),
            ra_deg.to_string(),
            dec_deg.to_string(),
            EPHEMERIS_MAGNITUDE.to_string(),
        ]);
    }

    let table = Table::from_rows(&["name", "ra_deg", "dec_deg", "magnitude"], rows)?;
    let mut catalogue = Catalogue::normalize(
        source.label,
        &table,
        &source.spec,
        (0.0, EPHEMERIS_MAGNITUDE),
        TargetKind::Ephemeris,
    )?;

    for entry in catalogue.entries_mut() {
        entry.size = match &entry.id {
            TargetId::String(name) if name == "sun" => 60.0,
            TargetId::String(name) if name == "moon" => 30.0,
            _ => 10.0,
        };
    }
    Ok(catalogue)
}

#[cfg(test)]
mod registry_test {
    use super::*;

    #[test]
    fn test_registry_shape() {
        assert_eq!(CatalogueSet::NUM_VIEWERS, 4);
        let starfields: Vec<_> = SOURCES.iter().filter(|s| s.is_starfield).collect();
        assert_eq!(starfields.len(), 1);
        assert_eq!(starfields[0].label, "STAR");
        // Deep-sky sources use the semicolon delimiter, the starfield a comma.
        for s in &SOURCES {
            if s.deep_sky {
                assert_eq!(s.delimiter, b';');
            }
        }
    }
}
