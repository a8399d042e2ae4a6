mod common;

use almanac::almanac_errors::AlmanacError;
use almanac::constants::TargetId;
use almanac::load_sky;

#[test]
fn test_end_to_end_load_cycle() {
    let sky = load_sky(&common::settings(), || false)
        .unwrap()
        .expect("load was not cancelled");

    // One day at one-hour cadence: exactly 24 samples, anchored at noon.
    assert_eq!(sky.frame().len(), 24);
    let mask = sky.frame().sample_window(0, 0, 1);
    assert!(mask[0]);
    assert_eq!(mask.iter().filter(|&&m| m).count(), 1);

    // Four viewers in registry order, every tensor row-aligned with its
    // catalogue and spanning the whole series.
    assert_eq!(sky.viewers().len(), 4);
    for viewer in sky.viewers() {
        assert_eq!(viewer.tensor().targets(), viewer.catalogue().len());
        assert_eq!(viewer.tensor().instants(), 24);
        assert!(viewer.on_display);
    }

    // The planet catalogue is synthesized from the ephemeris: all nine
    // bodies, fixed display sizes, and the sun above the horizon at noon.
    let planets = &sky.viewers()[0];
    assert_eq!(planets.names().len(), 9);
    let body = |name: &str| {
        planets
            .names()
            .iter()
            .position(|n| matches!(n, TargetId::String(s) if s == name))
            .unwrap()
    };
    assert_eq!(planets.sizes()[body("sun")], 60.0);
    assert_eq!(planets.sizes()[body("moon")], 30.0);
    assert_eq!(planets.sizes()[body("mars")], 10.0);
    assert!(planets.tensor().zenith(body("sun"), 0) < 90.0);

    // Starfield audit: one row dropped for a blank magnitude, one for an
    // unparseable coordinate, the rest retained.
    let stars = sky.viewers().iter().find(|v| v.is_starfield()).unwrap();
    assert!(stars.lines_on_display);
    assert_eq!(stars.catalogue().len(), 18);
    let audit = stars.catalogue().audit();
    assert_eq!(audit.source_rows, 20);
    assert_eq!(audit.missing_magnitude, 1);
    assert_eq!(audit.outside_magnitude_range, 0);
    assert_eq!(audit.unparseable_coords, 1);
    assert_eq!(audit.retained, 18);

    // Magnitude query (−2, 2) over the starfield: the fixed bright subset.
    let bright = stars.magnitude_mask((-2.0, 2.0));
    assert_eq!(bright.iter().filter(|&&b| b).count(), 13);

    // Combined query at the first instant with the full alt/az range:
    // Polaris is circumpolar from 54°N, Canopus never rises there.
    let combined = stars.combined_mask(&mask, (0.0, 90.0), (0.0, 360.0), (-2.0, 2.0));
    let hr = |id: u32| {
        stars
            .names()
            .iter()
            .position(|n| n == &TargetId::Int(id))
            .unwrap()
    };
    assert!(combined.get(hr(424), 0));
    assert!(!combined.get(hr(2326), 0));
    assert!(combined.count() <= 13);

    // Deep-sky catalogues share the deep-sky range: M1 (8.4) and NGC 253
    // (7.1) fall outside (−2, 6).
    let messier = &sky.viewers()[2];
    assert_eq!(messier.catalogue().len(), 3);
    assert_eq!(messier.catalogue().audit().outside_magnitude_range, 1);
    let ngc = &sky.viewers()[3];
    assert_eq!(ngc.catalogue().len(), 2);
    for viewer in [messier, ngc] {
        assert!(!viewer.is_starfield());
        for mag in viewer.magnitudes() {
            assert!((-2.0..=6.0).contains(mag));
        }
    }

    // Two Orion polylines plus one Ursa Major polyline.
    assert_eq!(sky.constellations().group_count(), 3);
}

#[test]
fn test_cancellation_between_steps() {
    // Immediate cancel: the first step finishes, nothing else starts.
    let result = load_sky(&common::settings(), || true).unwrap();
    assert!(result.is_none());

    // Cancel a few steps in, mid-viewer-loop.
    let mut polls = 0;
    let result = load_sky(&common::settings(), || {
        polls += 1;
        polls > 4
    })
    .unwrap();
    assert!(result.is_none());
}

#[test]
fn test_load_failures_abort_the_cycle() {
    let mut bad = common::settings();
    bad.catalogue_dir = common::catalogue_dir().join("nowhere");
    assert!(load_sky(&bad, || false).is_err());

    let mut bad = common::settings();
    bad.latitude = 95.0;
    assert!(matches!(
        load_sky(&bad, || false),
        Err(AlmanacError::InvalidVantage { .. })
    ));

    let mut bad = common::settings();
    bad.days = 0;
    assert!(matches!(
        load_sky(&bad, || false),
        Err(AlmanacError::InvalidTimeFrame(_))
    ));
}
