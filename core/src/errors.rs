use thiserror::Error;
use trackdash_analysis::errors::StatsError;

/// Errors that can occur with finding the config or data directories.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Unable to find the config directory for trackdash.")]
    Config,
    #[error("Unable to find the data directory for trackdash.")]
    Data,
}

/// Reasons a single chart could not be built.
///
/// These never escape the chart builders, which render a placeholder instead.
#[derive(Error, Debug)]
pub enum ChartBuildError {
    #[error("No tracks left to plot for {0}")]
    EmptySelection(&'static str),
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),
    #[error("Failed to serialize figure: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Chart builder panicked: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_str_eq;
    use rstest::rstest;

    #[rstest]
    #[case(DirectoryError::Config, "Unable to find the config directory for trackdash.")]
    #[case(DirectoryError::Data, "Unable to find the data directory for trackdash.")]
    fn test_directory_error(#[case] input: DirectoryError, #[case] expected: &str) {
        assert_str_eq!(input.to_string(), expected);
    }

    #[rstest]
    #[case(
        ChartBuildError::EmptySelection("genre distribution"),
        "No tracks left to plot for genre distribution"
    )]
    #[case(
        ChartBuildError::from(StatsError::DegenerateFit),
        "Statistics error: Cannot fit a line: need at least two points with distinct x values"
    )]
    #[case(ChartBuildError::Panicked("boom".into()), "Chart builder panicked: boom")]
    fn test_chart_build_error(#[case] input: ChartBuildError, #[case] expected: &str) {
        assert_str_eq!(input.to_string(), expected);
    }
}
