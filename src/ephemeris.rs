//! # Solar-system ephemeris
//!
//! Geocentric apparent RA/Dec for the sun, the moon and the planets, derived
//! from an externally supplied dataset of **mean orbital elements** keyed by
//! lowercase body names (`"mars"`, `"jupiter barycenter"`, …). The dataset is
//! loaded once per process and shared read-only by every position worker;
//! workers never reload it.
//!
//! ## Method
//!
//! Elements are evaluated at the requested date (linear centennial rates),
//! the mean anomaly is reduced through Kepler's equation with a Newton
//! iteration, and the perifocal position is rotated into heliocentric
//! ecliptic coordinates. Geocentric positions subtract the Earth–Moon
//! barycentre vector; the sun is its negation; the moon uses a compact
//! truncated lunar theory (largest periodic terms only, geocentric by
//! construction). The final rotation to the equatorial frame uses the mean
//! obliquity of date.
//!
//! Precision is sky-explorer grade (arcminutes over a few centuries around
//! J2000). Light-time, nutation and aberration are not modelled.

use camino::Utf8Path;
use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::Deserialize;

use crate::almanac_errors::AlmanacError;
use crate::constants::{Degree, FastHashMap, AU, DPI, MJD, RADEG};
use crate::time::centuries_since_j2000;

/// File name of the orbital-element dataset inside the catalogue directory.
pub const ELEMENTS_FILE: &str = "planetary_elements.csv";

/// Dataset key of the Earth–Moon barycentre, the implicit origin of every
/// geocentric reduction.
const EARTH: &str = "earth barycenter";

/// Mean obliquity of the ecliptic at J2000.0 (degrees) and its centennial
/// drift.
const OBLIQUITY_J2000: f64 = 23.439291;
const OBLIQUITY_RATE: f64 = -0.0130042;

const KEPLER_MAX_ITER: usize = 50;

/// One body's mean orbital elements at J2000.0 plus linear rates per Julian
/// century: semi-major axis, eccentricity, inclination, mean longitude,
/// longitude of perihelion, longitude of the ascending node.
#[derive(Debug, Clone, Deserialize)]
struct ElementRow {
    body: String,
    a_au: f64,
    a_rate: f64,
    e: f64,
    e_rate: f64,
    i_deg: f64,
    i_rate: f64,
    l_deg: f64,
    l_rate: f64,
    peri_deg: f64,
    peri_rate: f64,
    node_deg: f64,
    node_rate: f64,
}

/// The loaded solar-system body dataset.
#[derive(Debug, Clone)]
pub struct SolarEphemeris {
    bodies: FastHashMap<String, ElementRow>,
}

impl SolarEphemeris {
    /// Load the orbital-element dataset from a CSV file.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: the dataset file (see [`ELEMENTS_FILE`]).
    ///
    /// Return
    /// ----------
    /// * The ephemeris, or an [`AlmanacError`] on I/O or schema failure.
    pub fn load(path: &Utf8Path) -> Result<Self, AlmanacError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut bodies = FastHashMap::default();
        for record in reader.deserialize::<ElementRow>() {
            let row = record?;
            bodies.insert(row.body.to_lowercase(), row);
        }
        Ok(SolarEphemeris { bodies })
    }

    #[cfg(test)]
    fn from_element_rows(rows: Vec<ElementRow>) -> Self {
        let bodies = rows
            .into_iter()
            .map(|r| (r.body.to_lowercase(), r))
            .collect();
        SolarEphemeris { bodies }
    }

    /// Earth + Mars dataset for tests elsewhere in the crate.
    #[cfg(test)]
    pub(crate) fn test_fixture() -> Self {
        Self::from_element_rows(vec![ephemeris_test::earth_row(), ephemeris_test::mars_row()])
    }

    /// Whether `name` resolves to a computable body.
    ///
    /// The sun and moon are always computable provided the Earth elements are
    /// present; every other name must appear in the dataset.
    pub fn has_body(&self, name: &str) -> bool {
        match name {
            "sun" => self.bodies.contains_key(EARTH),
            "moon" => true,
            _ => self.bodies.contains_key(name),
        }
    }

    /// Geocentric apparent right ascension and declination of a body.
    ///
    /// Arguments
    /// -----------------
    /// * `body`: lowercase body name (`"sun"`, `"moon"`, `"mars"`,
    ///   `"saturn barycenter"`, …).
    /// * `mjd`: instant as Modified Julian Date (UTC).
    ///
    /// Return
    /// ----------
    /// * `(ra_deg, dec_deg)` with RA in [0, 360), or
    ///   [`AlmanacError::UnknownBody`] / [`AlmanacError::KeplerDivergence`].
    pub fn geocentric_radec(&self, body: &str, mjd: MJD) -> Result<(Degree, Degree), AlmanacError> {
        let t = centuries_since_j2000(mjd);

        let geocentric_ecl = match body {
            "sun" => -self.heliocentric(EARTH, t)?,
            "moon" => moon_geocentric_ecliptic(t),
            name => self.heliocentric(name, t)? - self.heliocentric(EARTH, t)?,
        };

        let obliquity = (OBLIQUITY_J2000 + OBLIQUITY_RATE * t) * RADEG;
        let to_equatorial: Matrix3<f64> =
            Rotation3::from_axis_angle(&Vector3::x_axis(), obliquity).into();
        let equ = to_equatorial * geocentric_ecl;

        let ra = equ.y.atan2(equ.x).rem_euclid(DPI) / RADEG;
        let dec = (equ.z / equ.norm()).asin() / RADEG;
        Ok((ra, dec))
    }

    /// Heliocentric ecliptic position of a dataset body, in AU.
    fn heliocentric(&self, name: &str, t: f64) -> Result<Vector3<f64>, AlmanacError> {
        let row = self
            .bodies
            .get(name)
            .ok_or_else(|| AlmanacError::UnknownBody(name.to_string()))?;

        let a = row.a_au + row.a_rate * t;
        let e = row.e + row.e_rate * t;
        let inclination = (row.i_deg + row.i_rate * t) * RADEG;
        let mean_longitude = (row.l_deg + row.l_rate * t) * RADEG;
        let perihelion = (row.peri_deg + row.peri_rate * t) * RADEG;
        let node = (row.node_deg + row.node_rate * t) * RADEG;

        let mean_anomaly = (mean_longitude - perihelion).rem_euclid(DPI);
        let eccentric_anomaly =
            solve_kepler(mean_anomaly, e).ok_or_else(|| AlmanacError::KeplerDivergence {
                body: name.to_string(),
            })?;

        let perifocal = Vector3::new(
            a * (eccentric_anomaly.cos() - e),
            a * (1.0 - e * e).sqrt() * eccentric_anomaly.sin(),
            0.0,
        );

        // Perifocal → heliocentric ecliptic: Rz(Ω) · Rx(i) · Rz(ω).
        let rotation: Matrix3<f64> = (Rotation3::from_axis_angle(&Vector3::z_axis(), node)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), inclination)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), perihelion - node))
        .into();

        Ok(rotation * perifocal)
    }
}

/// Solve Kepler's equation `M = E - e·sin E` for the eccentric anomaly.
///
/// Newton iteration starting from `E₀ = M + e·sin M`; converges in a handful
/// of steps for every planetary eccentricity.
fn solve_kepler(mean_anomaly: f64, e: f64) -> Option<f64> {
    let mut ea = mean_anomaly + e * mean_anomaly.sin();
    for _ in 0..KEPLER_MAX_ITER {
        let delta = (ea - e * ea.sin() - mean_anomaly) / (1.0 - e * ea.cos());
        ea -= delta;
        if delta.abs() < 1e-12 {
            return Some(ea);
        }
    }
    None
}

/// Geocentric ecliptic position of the moon, in AU.
///
/// Truncated lunar theory: the fundamental arguments plus the largest
/// longitude, latitude and distance terms. Good to a few arcminutes.
fn moon_geocentric_ecliptic(t: f64) -> Vector3<f64> {
    let rad = |deg: f64| deg * RADEG;

    // Fundamental arguments (degrees per Julian century).
    let lp = rad(218.3164477 + 481_267.88123421 * t); // mean longitude
    let d = rad(297.8501921 + 445_267.1114034 * t); // mean elongation
    let m = rad(357.5291092 + 35_999.0502909 * t); // solar mean anomaly
    let mp = rad(134.9633964 + 477_198.8675055 * t); // lunar mean anomaly
    let f = rad(93.272_095 + 483_202.0175233 * t); // argument of latitude

    let longitude = lp
        + rad(6.288774) * mp.sin()
        + rad(1.274027) * (2.0 * d - mp).sin()
        + rad(0.658314) * (2.0 * d).sin()
        + rad(0.213618) * (2.0 * mp).sin()
        - rad(0.185116) * m.sin()
        - rad(0.114332) * (2.0 * f).sin();

    let latitude = rad(5.128122) * f.sin()
        + rad(0.280602) * (mp + f).sin()
        + rad(0.277693) * (mp - f).sin()
        + rad(0.173237) * (2.0 * d - f).sin();

    let distance_km =
        385_000.56 - 20_905.355 * mp.cos() - 3_699.111 * (2.0 * d - mp).cos()
            - 2_955.968 * (2.0 * d).cos();
    let r = distance_km / AU;

    Vector3::new(
        r * latitude.cos() * longitude.cos(),
        r * latitude.cos() * longitude.sin(),
        r * latitude.sin(),
    )
}
