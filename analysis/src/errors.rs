use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("No values to summarize")]
    Empty,
    #[error("Values must be finite")]
    NonFinite,
    #[error("Cannot fit a line: need at least two points with distinct x values")]
    DegenerateFit,
    #[error("Mismatched input lengths: {0} != {1}")]
    LengthMismatch(usize, usize),
    #[error("At least one bin is required")]
    NoBins,
    #[error("Failed to compute quantile: {0}")]
    Quantile(String),
}

pub type StatsResult<T> = Result<T, StatsError>;
