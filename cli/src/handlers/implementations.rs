use std::fs;

use serde::Serialize;
use trackdash_core::charts::render::RenderedChart;
use trackdash_storage::dataset::PopularityRange;

use crate::handlers::printing;

use super::{Command, CommandHandler, Context};

/// What `render` writes to `manifest.json`.
#[derive(Debug, Serialize)]
struct Manifest<'a> {
    popularity_range: PopularityRange,
    charts: Vec<ManifestEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ManifestEntry<'a> {
    #[serde(flatten)]
    chart: &'a RenderedChart,
    file: String,
}

impl CommandHandler for Command {
    type Output = anyhow::Result<()>;

    fn handle<W1: std::fmt::Write, W2: std::fmt::Write>(
        &self,
        ctx: &Context,
        stdout: &mut W1,
        stderr: &mut W2,
    ) -> Self::Output {
        match self {
            Self::Render {
                popularity_min,
                popularity_max,
                out,
            } => {
                let range = PopularityRange::new(
                    popularity_min.unwrap_or_else(|| ctx.default_range.min()),
                    popularity_max.unwrap_or_else(|| ctx.default_range.max()),
                )?;
                let charts = ctx.dashboard.render(&ctx.dataset, &range);

                fs::create_dir_all(out)?;
                let mut entries = Vec::new();
                for chart in charts.iter() {
                    let file = format!("{}.html", chart.name);
                    fs::write(out.join(&file), &chart.html)?;
                    entries.push(ManifestEntry { chart, file });
                }
                let manifest = Manifest {
                    popularity_range: range,
                    charts: entries,
                };
                fs::write(
                    out.join("manifest.json"),
                    serde_json::to_string_pretty(&manifest)?,
                )?;

                write!(stdout, "{}", printing::render_report(&charts, out)?)?;
                let placeholders = charts.placeholders();
                if placeholders > 0 {
                    writeln!(
                        stderr,
                        "{placeholders} charts could not be built and were replaced by placeholders, check the logs for details"
                    )?;
                }
                Ok(())
            }
            Self::Summary => {
                let summary = ctx.dataset.summary();
                write!(stdout, "{}", printing::dataset_summary(&summary)?)?;
                Ok(())
            }
        }
    }
}
