//! Observation vantage point and lazily opened ephemeris handle.

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::OnceCell;

use crate::almanac_errors::AlmanacError;
use crate::constants::Degree;
use crate::ephemeris::{SolarEphemeris, ELEMENTS_FILE};

/// The Earth-surface observation point all positions are computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vantage {
    /// Geodetic latitude in degrees, north-positive.
    pub latitude: Degree,
    /// Geodetic longitude in degrees, east-positive.
    pub longitude: Degree,
}

impl Vantage {
    /// Validate and build a vantage.
    ///
    /// Return
    /// ----------
    /// * The vantage, or [`AlmanacError::InvalidVantage`] when the latitude
    ///   is outside −90..90 or the longitude outside −180..180.
    pub fn new(latitude: Degree, longitude: Degree) -> Result<Self, AlmanacError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(AlmanacError::InvalidVantage {
                latitude,
                longitude,
            });
        }
        Ok(Vantage {
            latitude,
            longitude,
        })
    }
}

/// A [`Vantage`] paired with the solar-system ephemeris serving it.
///
/// The ephemeris dataset is opened on first use and cached; subsequent
/// accessors return the same shared reference, which worker threads borrow
/// read-only for the lifetime of a computation.
#[derive(Debug)]
pub struct Observatory {
    vantage: Vantage,
    elements_path: Utf8PathBuf,
    ephemeris: OnceCell<SolarEphemeris>,
}

impl Observatory {
    /// Create an observatory rooted in a catalogue directory.
    ///
    /// The ephemeris dataset itself is **not** opened yet; it is lazily
    /// loaded the first time [`Observatory::ephemeris`] is called.
    pub fn new(vantage: Vantage, catalogue_dir: &Utf8Path) -> Self {
        Observatory {
            vantage,
            elements_path: catalogue_dir.join(ELEMENTS_FILE),
            ephemeris: OnceCell::new(),
        }
    }

    pub fn vantage(&self) -> Vantage {
        self.vantage
    }

    /// Get the lazily-initialized ephemeris handle.
    ///
    /// If this is the first call, the dataset is read and cached in an
    /// internal [`OnceCell`]. Subsequent calls return the same reference.
    pub fn ephemeris(&self) -> Result<&SolarEphemeris, AlmanacError> {
        self.ephemeris
            .get_or_try_init(|| SolarEphemeris::load(&self.elements_path))
    }
}

#[cfg(test)]
mod observatory_test {
    use super::*;

    #[test]
    fn test_vantage_validation() {
        assert!(Vantage::new(54.0, 0.0).is_ok());
        assert!(Vantage::new(-90.0, 180.0).is_ok());
        assert!(matches!(
            Vantage::new(91.0, 0.0),
            Err(AlmanacError::InvalidVantage { .. })
        ));
        assert!(matches!(
            Vantage::new(0.0, 181.0),
            Err(AlmanacError::InvalidVantage { .. })
        ));
    }
}
