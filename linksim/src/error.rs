use thiserror::Error;

/// Malformed simulation inputs.
///
/// These are surfaced as soon as they are detected and are never
/// retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("power range is empty, min_w {min_w} > max_w {max_w}")]
    PowerRange { min_w: f64, max_w: f64 },

    #[error("power increment must be positive, got {0}")]
    Increment(f64),

    #[error("{name} must be within [0, 100], got {value}")]
    Percentage { name: &'static str, value: f64 },

    #[error("scenario is missing a name")]
    UnnamedScenario,

    #[error("scenario {0:?} is defined more than once")]
    DuplicateScenario(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("invalid shadowing distribution, mu {mu}, sigma {sigma}")]
    Shadowing { mu: f64, sigma: f64 },

    #[error("modulation and coding table for {0} is empty")]
    EmptyMcsTable(String),

    #[error("modulation and coding table for {generation} is not sorted at CQI {cqi}")]
    UnsortedMcsTable { generation: String, cqi: u8 },

    #[error("no modulation and coding table for generation {0}")]
    UnknownGeneration(String),

    #[error("hourly demand table has {0} entries, expected 24")]
    HourlyTableLen(usize),

    #[error("hourly demand table is missing hour {0}")]
    HourlyTableHour(usize),

    #[error("site area polygon is degenerate")]
    DegeneratePolygon,

    #[error("sampling grid produced {available} candidates, {requested} receivers requested")]
    TooFewCandidates { requested: usize, available: usize },
}
