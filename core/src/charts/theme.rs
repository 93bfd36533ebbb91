//! The dashboard's dark theme and color palettes.

use super::figure::{Annotation, Axis, Figure, Font, HoverLabel, Layout, Legend, Title};

pub const GREEN: &str = "#1DB954";
pub const BLACK: &str = "#191414";
pub const DARK_GRAY: &str = "#282828";
pub const LIGHT_GRAY: &str = "#B3B3B3";
pub const WHITE: &str = "#FFFFFF";

/// Greens, from the brand color to pale.
pub const SEQUENTIAL: [&str; 5] = ["#1DB954", "#1ed760", "#52eb80", "#86efa0", "#baf3c0"];
/// Red through gray to green.
pub const DIVERGING: [&str; 7] = [
    "#FF4632", "#FF8A80", "#FFBDAF", "#B3B3B3", "#90F0B3", "#52CD7C", "#1DB954",
];
/// Distinct colors for categorical traces.
pub const QUALITATIVE: [&str; 7] = [
    "#1DB954", "#FF4632", "#1E90FF", "#FFB100", "#E91E63", "#9C27B0", "#00BCD4",
];

pub const HOVER_FONT_FAMILY: &str = "Segoe UI";
pub const TRANSLUCENT_BLACK: &str = "rgba(0,0,0,0.8)";
pub const TRANSPARENT: &str = "rgba(0,0,0,0)";

/// The `i`-th qualitative color, cycling.
#[must_use]
pub const fn qualitative(i: usize) -> &'static str {
    QUALITATIVE[i % QUALITATIVE.len()]
}

/// An evenly spaced Plotly colorscale over `colors`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn colorscale(colors: &[&str]) -> Vec<(f64, String)> {
    let last = colors.len().saturating_sub(1).max(1) as f64;
    colors
        .iter()
        .enumerate()
        .map(|(i, c)| (i as f64 / last, (*c).to_owned()))
        .collect()
}

/// Dark hover boxes with the dashboard font.
#[must_use]
pub fn hoverlabel(bgcolor: &str) -> HoverLabel {
    HoverLabel {
        bgcolor: Some(bgcolor.to_owned()),
        font: Some(Font {
            color: Some(WHITE.to_owned()),
            size: Some(14),
            family: Some(HOVER_FONT_FAMILY),
        }),
    }
}

fn themed_axis(axis: &mut Axis) {
    axis.gridcolor = Some(LIGHT_GRAY.to_owned());
    axis.gridwidth = Some(0.2);
    axis.zerolinecolor = Some(LIGHT_GRAY.to_owned());
    if let Some(title) = &mut axis.title {
        title.font.get_or_insert_with(|| Font::color(WHITE));
    }
}

/// Apply the dark theme in place.
///
/// Backgrounds, fonts, grid lines, and the title style are always overwritten. Legend visibility
/// and hover labels are only filled in when a builder left them unset.
pub fn apply_dark_theme(figure: &mut Figure) {
    let layout = &mut figure.layout;
    layout.plot_bgcolor = Some(DARK_GRAY.to_owned());
    layout.paper_bgcolor = Some(BLACK.to_owned());
    layout.font = Some(Font::color(WHITE));

    if let Some(title) = &mut layout.title {
        title.x = Some(0.5);
        title.font = Some(Font {
            color: Some(WHITE.to_owned()),
            size: Some(24),
            family: None,
        });
    }

    layout.showlegend.get_or_insert(true);
    let legend = layout.legend.get_or_insert_with(Legend::default);
    legend.bgcolor = Some(TRANSPARENT.to_owned());
    legend.font = Some(Font::color(WHITE));

    layout.hoverlabel.get_or_insert_with(|| hoverlabel(DARK_GRAY));

    themed_axis(&mut layout.xaxis);
    themed_axis(&mut layout.yaxis);
}

/// A themed, data-free figure that just says what failed to load.
#[must_use]
pub fn placeholder(label: &str) -> Figure {
    let mut figure = Figure::new(Layout {
        title: Some(Title::new(label.to_owned())),
        xaxis: Axis::hidden(),
        yaxis: Axis::hidden(),
        showlegend: Some(false),
        height: Some(400),
        annotations: vec![Annotation {
            text: format!("Error loading {label}"),
            xref: Some("paper"),
            yref: Some("paper"),
            x: Some(0.5),
            y: Some(0.5),
            showarrow: false,
            font: Some(Font {
                color: Some(LIGHT_GRAY.to_owned()),
                size: Some(18),
                family: None,
            }),
            ..Annotation::default()
        }],
        ..Layout::default()
    });
    apply_dark_theme(&mut figure);
    figure
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_colorscale_is_evenly_spaced() {
        let scale = colorscale(&SEQUENTIAL);
        let stops: Vec<f64> = scale.iter().map(|(s, _)| *s).collect();
        assert_eq!(stops, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(scale[0].1, GREEN);
    }

    #[test]
    fn test_qualitative_cycles() {
        assert_eq!(qualitative(0), GREEN);
        assert_eq!(qualitative(7), GREEN);
        assert_eq!(qualitative(8), "#FF4632");
    }

    #[test]
    fn test_dark_theme() {
        let mut figure = Figure::new(Layout::titled("Chart").axes("x", "y"));
        apply_dark_theme(&mut figure);
        let layout = &figure.layout;

        assert_eq!(layout.plot_bgcolor.as_deref(), Some(DARK_GRAY));
        assert_eq!(layout.paper_bgcolor.as_deref(), Some(BLACK));
        assert_eq!(layout.title.as_ref().and_then(|t| t.x), Some(0.5));
        assert_eq!(layout.showlegend, Some(true));
        assert_eq!(layout.xaxis.gridwidth, Some(0.2));
        assert_eq!(layout.yaxis.zerolinecolor.as_deref(), Some(LIGHT_GRAY));
        assert_eq!(
            layout.legend.as_ref().and_then(|l| l.bgcolor.as_deref()),
            Some(TRANSPARENT)
        );
    }

    #[test]
    fn test_dark_theme_keeps_explicit_choices() {
        let mut figure = Figure::new(Layout {
            showlegend: Some(false),
            hoverlabel: Some(hoverlabel(TRANSLUCENT_BLACK)),
            ..Layout::default()
        });
        apply_dark_theme(&mut figure);

        assert_eq!(figure.layout.showlegend, Some(false));
        assert_eq!(
            figure.layout.hoverlabel.and_then(|h| h.bgcolor),
            Some(TRANSLUCENT_BLACK.to_owned())
        );
    }

    #[test]
    fn test_placeholder() {
        let figure = placeholder("genre distribution");
        assert!(figure.data.is_empty());
        assert_eq!(
            figure.layout.annotations[0].text,
            "Error loading genre distribution"
        );
        assert_eq!(figure.layout.paper_bgcolor.as_deref(), Some(BLACK));
    }
}
