use std::path::PathBuf;

use clap::{Parser, ValueHint};
use trackdash_core::{
    config::{Settings, SettingsOverrides},
    dashboard::Dashboard,
    get_data_dir,
    logger::{init_logger, init_tracing},
};
use trackdash_storage::{loader::load_with, reconcile::reconcile_from_path};

mod handlers;

use handlers::{CommandHandler, Context, utils::WriteAdapter};

/// Options configurable via the CLI.
#[derive(Debug, Parser)]
#[command(name = "trackdash", version = env!("CARGO_PKG_VERSION"), about)]
struct Flags {
    /// config file path
    #[clap(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
    /// The top tracks CSV to load
    #[clap(long, value_hint = ValueHint::FilePath)]
    data: Option<PathBuf>,
    /// The CSV to back-fill missing genres from, defaults to the data file
    #[clap(long, value_hint = ValueHint::FilePath)]
    patch: Option<PathBuf>,
    /// Set the log level.
    #[clap(long)]
    log_level: Option<log::LevelFilter>,
    /// Report tracing spans alongside the log.
    #[clap(long)]
    trace_spans: bool,
    #[clap(subcommand)]
    subcommand: handlers::Command,
}

#[cfg(not(tarpaulin_include))]
fn main() -> anyhow::Result<()> {
    let flags = Flags::parse();

    let config = match flags.config {
        Some(path) => path,
        None => Settings::get_config_path()?,
    };
    let settings = Settings::init(
        config,
        SettingsOverrides {
            data_path: flags.data,
            patch_path: flags.patch,
            log_level: flags.log_level,
        },
    )?;

    let log_file = match get_data_dir() {
        Ok(dir) => Some(dir.join("trackdash.log")),
        Err(e) => {
            eprintln!("Not logging to a file: {e}");
            None
        }
    };
    init_logger(settings.dashboard.log_level, log_file.as_deref());
    if flags.trace_spans {
        tracing::subscriber::set_global_default(init_tracing())?;
    }

    let mut dataset = load_with(&settings.data.path, &settings.data.encodings)?;
    reconcile_from_path(
        &mut dataset,
        settings.data.patch_path(),
        &settings.data.encodings,
    );

    let ctx = Context {
        dataset,
        dashboard: Dashboard::new(settings.cache.ttl(), settings.charts),
        default_range: settings.dashboard.popularity_range()?,
    };

    let mut stdout = WriteAdapter(std::io::stdout());
    let mut stderr = WriteAdapter(std::io::stderr());

    flags.subcommand.handle(&ctx, &mut stdout, &mut stderr)
}
