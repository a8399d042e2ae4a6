use thiserror::Error;

/// Errors surfaced by the catalogue normalizer, the time-series builder and
/// the parallel position engine.
///
/// Configuration errors abort the whole bulk-load cycle; data-quality issues
/// never appear here, they are absorbed locally with an audit trail
/// (row-drop counts, unresolved-identifier warnings).
#[derive(Error, Debug)]
pub enum AlmanacError {
    #[error("Missing expected column: {0}")]
    MissingColumn(String),

    #[error("Unhandled coordinate format for {field}: {kind}")]
    InvalidCoordKind { field: &'static str, kind: String },

    #[error("Dirty source: {0}")]
    DirtySource(String),

    #[error("Combined RA/Dec column must contain exactly two space-separated components: {0:?}")]
    CombinedColumnSplit(String),

    #[error("Invalid vantage: latitude {latitude} must be in -90..90, longitude {longitude} in -180..180")]
    InvalidVantage { latitude: f64, longitude: f64 },

    #[error("Invalid time frame: {0}")]
    InvalidTimeFrame(String),

    #[error("Unknown ephemeris body: {0}")]
    UnknownBody(String),

    #[error("Kepler solver failed to converge for {body}")]
    KeplerDivergence { body: String },

    #[error("Position worker failed: {0}")]
    ComputeWorker(String),

    #[error("Unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
