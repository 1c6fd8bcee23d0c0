use thiserror::Error;

/// Contract violations raised by [`PortfolioModel`](crate::PortfolioModel) mutators.
///
/// None of these are recoverable by retrying the same call; the caller decides how
/// to present them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortfolioError {
    #[error("portfolio already holds the maximum of {max} stocks")]
    CapacityExceeded { max: usize },

    #[error("a portfolio must keep at least one holding")]
    LastHolding,

    #[error("holding index {index} out of range (portfolio has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("total weight is zero, nothing to normalize")]
    NothingToNormalize,
}

/// Reasons a portfolio is refused at the submission gate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("portfolio weights must sum to 100% (currently {:.1}%)", .total * 100.0)]
    Unbalanced { total: f64 },

    #[error("holding {} has no ticker", .index + 1)]
    EmptyTicker { index: usize },

    #[error("ticker {ticker:?} is longer than {max} characters")]
    TickerTooLong { ticker: String, max: usize },

    #[error("{ticker} has a zero weight; remove it or give it an allocation")]
    ZeroWeight { ticker: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("invalid {field}: {value} is outside [{min}, {max}]")]
    InvalidParameter {
        field: &'static str,
        value: i64,
        min: u32,
        max: u32,
    },
}

/// A simulation response that does not match the expected result shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedResult {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("`{0}` is not a JSON object")]
    NotAnObject(String),

    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("field `{0}` is not numeric")]
    NotNumeric(String),

    #[error("field `{0}` is not a list")]
    NotAList(String),

    #[error("simulation_data.paths_sample is empty")]
    EmptyPaths,

    #[error("simulation_data.paths_sample[{index}] is empty")]
    EmptyPath { index: usize },

    #[error("simulation_data.paths_sample[{index}] has {found} points, expected {expected}")]
    RaggedPaths {
        index: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("no simulated paths to chart")]
    EmptyPathSet,

    #[error("no final values to chart")]
    EmptyDistribution,

    #[error("portfolio has no holdings")]
    EmptyPortfolio,
}
