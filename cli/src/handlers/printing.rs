//! Handles displaying the output of the commands in a human readable format.

use std::{fmt::Write, path::Path};

use trackdash_core::dashboard::DashboardCharts;
use trackdash_storage::dataset::DatasetSummary;

pub fn dataset_summary(summary: &DatasetSummary) -> Result<String, std::fmt::Error> {
    let mut output = String::new();

    writeln!(output, "Snapshot:")?;
    writeln!(output, "\tTracks: {}", summary.tracks)?;
    writeln!(output, "\tArtists: {}", summary.artists)?;
    writeln!(output, "\tGenres: {}", summary.genres)?;
    writeln!(
        output,
        "\tTracks without genres: {}",
        summary.tracks_without_genres
    )?;
    match (summary.earliest_year, summary.latest_year) {
        (Some(earliest), Some(latest)) => writeln!(output, "\tReleased: {earliest}-{latest}")?,
        _ => writeln!(output, "\tReleased: unknown")?,
    }

    Ok(output)
}

pub fn render_report(charts: &DashboardCharts, out: &Path) -> Result<String, std::fmt::Error> {
    let mut output = String::new();
    let range = charts.popularity_range;

    writeln!(
        output,
        "Rendered {} charts for popularity {}-{} into {}:",
        charts.iter().count(),
        range.min(),
        range.max(),
        out.display()
    )?;
    for chart in charts.iter() {
        if chart.placeholder {
            writeln!(output, "\t{}.html: \"{}\" (placeholder)", chart.name, chart.title)?;
        } else {
            writeln!(output, "\t{}.html: \"{}\"", chart.name, chart.title)?;
        }
    }

    Ok(output)
}
