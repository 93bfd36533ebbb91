//----------------------------------------------------------------------------------------- std lib
use std::{
    fs::File,
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
    time::Instant,
};
//--------------------------------------------------------------------------------- other libraries
use env_logger::fmt::style::{AnsiColor, Style};
use log::info;
use once_cell::sync::Lazy;
use tracing_subscriber::layer::SubscriberExt as _;

// This will get initialized below.
/// Returns the init [`Instant`]
pub static INIT_INSTANT: Lazy<Instant> = Lazy::new(Instant::now);

/// Returns the seconds since [`INIT_INSTANT`].
#[cfg(not(tarpaulin_include))]
pub fn uptime() -> u64 {
    INIT_INSTANT.elapsed().as_secs()
}

/// Filter directives applied when `RUST_LOG` is unset: everything off except our own crates.
#[must_use]
pub fn default_directives(filter: log::LevelFilter) -> String {
    format!("off,trackdash={filter}")
}

/// Writes log lines to stderr and, when configured, to a log file.
struct Tee {
    file: Option<Arc<Mutex<File>>>,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Some(file) = &self.file {
            let mut file = file
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            file.write_all(&strip_ansi(buf))?;
        }
        std::io::stderr().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if let Some(file) = &self.file {
            file.lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .flush()?;
        }
        std::io::stderr().flush()
    }
}

/// Drop ANSI escape sequences so the log file stays readable.
fn strip_ansi(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len());
    let mut bytes = buf.iter().copied();
    while let Some(b) = bytes.next() {
        if b == 0x1B {
            // skip until the final byte of the CSI sequence
            for c in bytes.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(b);
        }
    }
    out
}

//---------------------------------------------------------------------------------------------------- Logger init function
#[allow(clippy::module_name_repetitions)]
/// Initializes the logger.
///
/// This enables console logging on all the internals of `Trackdash`, and additionally writes
/// every line to `log_file` if one is given.
///
/// Functionality is provided by [`log`].
///
/// The levels are:
/// - ERROR
/// - WARN
/// - INFO
/// - DEBUG
/// - TRACE
///
/// # Panics
/// This must only be called _once_.
/// Open `path` for appending, creating its parent directories first.
///
/// Failures are reported on stderr since the logger isn't running yet.
fn open_log_file(path: &Path) -> Option<Arc<Mutex<File>>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Unable to create log directory {}: {e}", parent.display());
            return None;
        }
    }
    match File::options().create(true).append(true).open(path) {
        Ok(file) => Some(Arc::new(Mutex::new(file))),
        Err(e) => {
            eprintln!("Unable to open log file {}: {e}", path.display());
            None
        }
    }
}

#[cfg(not(tarpaulin_include))]
pub fn init_logger(filter: log::LevelFilter, log_file: Option<&Path>) {
    // Initialize timer.
    use crate::format_duration;
    let now = Lazy::force(&INIT_INSTANT);

    // If `RUST_LOG` isn't set, disable all library crate logs except for trackdash and its
    // sub-crates.
    let env = std::env::var("RUST_LOG").ok().filter(|e| !e.is_empty());
    let directives = env.clone().unwrap_or_else(|| default_directives(filter));

    let file = log_file.and_then(open_log_file);

    env_logger::Builder::new()
        .format(move |buf, record| {
            let (level, color) = match record.level() {
                log::Level::Debug => ("D", AnsiColor::Blue),
                log::Level::Trace => ("T", AnsiColor::Magenta),
                log::Level::Info => ("I", AnsiColor::White),
                log::Level::Warn => ("W", AnsiColor::Yellow),
                log::Level::Error => ("E", AnsiColor::Red),
            };
            let level_style = Style::new().fg_color(Some(color.into())).bold();
            let dimmed = Style::new().dimmed();
            writeln!(
                buf,
                // Longest PATH in the repo: `core/src/charts/popularity.rs` - `29` characters
                // Longest file in the repo: `core/src/charts/mod.rs`        - `3` digits
                //
                //      Longest PATH ---|        |--- Longest file
                //                      |        |
                //                      v        v
                "| {level_style}{level}{level_style:#} | {dimmed}{}{dimmed:#} | {dimmed}{: >29}{dimmed:#} @ {dimmed}{: <4}{dimmed:#} | {}",
                format_duration(&now.elapsed()),
                record.file_static().unwrap_or("???"),
                record.line().unwrap_or(0),
                record.args(),
            )
        })
        .target(env_logger::Target::Pipe(Box::new(Tee { file })))
        .write_style(env_logger::WriteStyle::Always)
        .parse_filters(&directives)
        .init();

    match env {
        Some(env) => info!("Log Level (RUST_LOG) ... {env}"),
        None => info!("Log Level (Flag) ... {filter}"),
    }
}

/// Initializes the tracing layer.
///
/// Spans from `#[instrument]`ed functions are reported to stderr when they close, along with how
/// long they were busy, which is how slow chart builders show up.
#[must_use]
pub fn init_tracing() -> impl tracing::Subscriber + Send + Sync {
    let subscriber = tracing_subscriber::registry();

    #[cfg(not(feature = "verbose_tracing"))]
    let filter = tracing_subscriber::EnvFilter::builder()
        .parse_lossy("off,trackdash=info");
    #[cfg(feature = "verbose_tracing")]
    let filter = tracing_subscriber::EnvFilter::builder()
        .parse_lossy("off,trackdash=trace");

    subscriber.with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE),
    )
}
