pub mod implementations;
pub mod printing;
pub mod utils;


use std::path::PathBuf;

use clap::Subcommand;
use trackdash_core::dashboard::Dashboard;
use trackdash_storage::dataset::{Dataset, PopularityRange};

/// Everything a command needs: the loaded snapshot and the dashboard that renders it.
#[derive(Debug)]
pub struct Context {
    pub dataset: Dataset,
    pub dashboard: Dashboard,
    /// Used for whichever bound a command does not set.
    pub default_range: PopularityRange,
}

pub trait CommandHandler {
    type Output;

    fn handle<W1: std::fmt::Write, W2: std::fmt::Write>(
        &self,
        ctx: &Context,
        stdout: &mut W1,
        stderr: &mut W2,
    ) -> Self::Output;
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// Render every chart into a directory of HTML fragments, plus a manifest listing them
    Render {
        /// Lowest track popularity to include in the filtered charts
        #[clap(long)]
        popularity_min: Option<f64>,
        /// Highest track popularity to include in the filtered charts
        #[clap(long)]
        popularity_max: Option<f64>,
        /// Where to write the fragments
        #[clap(long, short, default_value = "dashboard", value_hint = clap::ValueHint::DirPath)]
        out: PathBuf,
    },
    /// Print a summary of the loaded snapshot
    Summary,
}
