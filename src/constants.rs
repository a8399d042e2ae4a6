//! # Constants and type definitions for Almanac
//!
//! This module centralizes the **conversion factors**, **engine tuning
//! constants**, and **common type definitions** used throughout the
//! `almanac` library.
//!
//! ## Overview
//!
//! - Angular and temporal conversion factors
//! - Core type aliases used across the crate
//! - Identifiers for catalogued sky targets
//!
//! These definitions are used by all main modules, including the coordinate
//! normalizer, the time-series builder, and the parallel position engine.

use std::collections::HashMap;

use ahash::RandomState;

// -------------------------------------------------------------------------------------------------
// Conversion factors
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric normalization
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Degrees of right ascension per hour of right ascension
pub const DEG_PER_HOUR: f64 = 15.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Days per Julian century, used when evaluating mean orbital elements
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

// -------------------------------------------------------------------------------------------------
// Engine tuning
// -------------------------------------------------------------------------------------------------

/// Smallest target batch handed to one position worker.
///
/// Batches smaller than this do not amortize the per-worker fixed cost
/// (trigonometric scaffolding, ephemeris resolution) against the per-target
/// variable cost.
pub const MIN_BATCH_SIZE: usize = 275;

/// Placeholder visual magnitude assigned to ephemeris bodies.
///
/// True apparent magnitudes are not computed for the sun, moon and planets;
/// every ephemeris entry carries this constant instead.
pub const EPHEMERIS_MAGNITUDE: f64 = 1.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Right ascension expressed in hours
pub type Hour = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
/// Harvard Reference number, the bright-star catalogue identifier scheme
pub type HrId = u32;
/// Display colour as an RGB triple in [0, 1]
pub type Rgb = [f32; 3];

/// Hash map with the fast `ahash` hasher used across the crate
pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

// -------------------------------------------------------------------------------------------------
// Identifiers
// -------------------------------------------------------------------------------------------------

/// Identifier of a catalogued sky target.
///
/// This can be:
/// - A Harvard Reference number from the bright-star catalogue (e.g. `Int(2491)`)
/// - A deep-sky designation (e.g. `"NGC 224"`)
/// - A lowercase ephemeris body name (e.g. `"jupiter barycenter"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetId {
    /// Integer-based designation (e.g. HR 2491)
    Int(u32),
    /// String-based designation (deep-sky names, ephemeris bodies)
    String(String),
}

impl TargetId {
    /// Harvard Reference number of this target, when it carries one.
    pub fn hr(&self) -> Option<HrId> {
        match self {
            TargetId::Int(n) => Some(*n),
            TargetId::String(_) => None,
        }
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetId::Int(n) => write!(f, "{n}"),
            TargetId::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for TargetId {
    fn from(n: u32) -> Self {
        TargetId::Int(n)
    }
}

impl From<&str> for TargetId {
    fn from(s: &str) -> Self {
        match s.trim().parse::<u32>() {
            Ok(n) => TargetId::Int(n),
            Err(_) => TargetId::String(s.to_string()),
        }
    }
}
