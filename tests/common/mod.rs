use almanac::LoadSettings;
use camino::Utf8PathBuf;

/// The fixture catalogue directory shipped with the test suite.
pub fn catalogue_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/catalogues")
}

/// One day at one-hour cadence from 54°N on 2025-01-01, over the fixtures.
pub fn settings() -> LoadSettings {
    LoadSettings {
        latitude: 54.0,
        longitude: 0.0,
        year: 2025,
        month: 1,
        day: 1,
        days: 1,
        sample_rate: 3600,
        deep_sky_range: (-2.0, 6.0),
        starfield_range: (-2.0, 6.0),
        catalogue_dir: catalogue_dir(),
    }
}
