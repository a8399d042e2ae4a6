//! Parsing of the right-ascension and declination representations found in
//! catalogue source files.
//!
//! All conversions land in canonical **degrees**; right ascension additionally
//! keeps an hour form (degrees / 15) for the position engine. Unparseable
//! strings yield `None` so callers can drop the row and count it, never panic.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{Degree, Hour, DEG_PER_HOUR};

/// Matches a sexagesimal angle in either whitespace-separated form
/// (`"05 12 34.5"`) or unit-suffixed form (`"05h 12m 34.5s"`, `"+41° 16′ 09″"`).
/// The seconds field is optional.
static SEXAGESIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        ^\s*
        ([+-])?\s*
        (\d+(?:\.\d+)?)
        \s*(?:[hHdD°:]\s*|\s+)
        (\d+(?:\.\d+)?)
        \s*(?:[mM'′:]\s*|\s+)?
        (?:(\d+(?:\.\d+)?)\s*[sS"″]?)?
        \s*$
    "#,
    )
    .expect("sexagesimal pattern")
});

/// Parse a sexagesimal string into decimal units of its leading field.
///
/// Arguments
/// ---------
/// * `text`: the angle, e.g. `"05h 12m 34.5s"` or `"-16 42 58"`
///
/// Return
/// ------
/// * `Option<f64>`: hours (or degrees) as a signed decimal, `None` if the
///   input does not have two or three numeric fields.
fn parse_sexagesimal(text: &str) -> Option<f64> {
    let caps = SEXAGESIMAL.captures(text)?;

    let sign = match caps.get(1).map(|m| m.as_str()) {
        Some("-") => -1.0,
        _ => 1.0,
    };
    let whole: f64 = caps.get(2)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(3)?.as_str().parse().ok()?;
    let seconds: f64 = match caps.get(4) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0.0,
    };

    Some(sign * (whole + minutes / 60.0 + seconds / 3600.0))
}

/// Parse a sexagesimal right ascension (hours minutes seconds) to degrees.
///
/// Arguments
/// ---------
/// * `ra`: a string such as `"05 12 34.5"` or `"05h 12m 34.5s"`
///
/// Return
/// ------
/// * `Option<Degree>`: the right ascension in degrees, `None` if malformed.
pub(crate) fn parse_ra_to_deg(ra: &str) -> Option<Degree> {
    let hours = parse_sexagesimal(ra)?;
    Some(hours * DEG_PER_HOUR)
}

/// Parse a sexagesimal declination (`±DD MM SS.S`) to degrees.
pub(crate) fn parse_dec_to_deg(dec: &str) -> Option<Degree> {
    parse_sexagesimal(dec)
}

/// Decimal hour angle → degrees.
#[inline]
pub(crate) fn hours_to_deg(hours: Hour) -> Degree {
    hours * DEG_PER_HOUR
}

/// Degrees → decimal hours of right ascension.
#[inline]
pub(crate) fn deg_to_hours(deg: Degree) -> Hour {
    deg / DEG_PER_HOUR
}

#[cfg(test)]
mod conversion_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ra_to_deg() {
        assert_relative_eq!(
            parse_ra_to_deg("05 12 34.5").unwrap(),
            78.14375,
            epsilon = 1e-10
        );
        assert_relative_eq!(
            parse_ra_to_deg("22 52 23.37").unwrap(),
            343.097375,
            epsilon = 1e-10
        );
        assert_eq!(parse_ra_to_deg("1 2 3.4.5"), None);
        assert_eq!(parse_ra_to_deg("not an angle"), None);
    }

    #[test]
    fn test_ra_suffixed_matches_plain() {
        let plain = parse_ra_to_deg("05 12 34.5").unwrap();
        let suffixed = parse_ra_to_deg("05h 12m 34.5s").unwrap();
        assert_relative_eq!(plain, suffixed, epsilon = 1e-12);

        // Same value expressed as a decimal hour angle.
        let decimal = hours_to_deg(5.209583333333333);
        assert_relative_eq!(plain, decimal, epsilon = 1e-9);
    }

    #[test]
    fn test_dec_to_deg() {
        assert_relative_eq!(
            parse_dec_to_deg("-00 30 14.2").unwrap(),
            -0.5039444444444444,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            parse_dec_to_deg("+13 55 42.7").unwrap(),
            13.928527777777777,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            parse_dec_to_deg("+41° 16′ 09″").unwrap(),
            41.269166666666667,
            epsilon = 1e-12
        );
        assert_eq!(parse_dec_to_deg("89 15 50.2.3"), None);
        assert_eq!(parse_dec_to_deg("89"), None);
    }

    #[test]
    fn test_seconds_field_optional() {
        assert_relative_eq!(parse_dec_to_deg("-05 27").unwrap(), -5.45, epsilon = 1e-12);
        assert_relative_eq!(
            parse_ra_to_deg("05h 35m").unwrap(),
            83.75,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_hours_roundtrip() {
        assert_relative_eq!(deg_to_hours(hours_to_deg(5.2096)), 5.2096, epsilon = 1e-12);
    }
}
