//! Turning figures into embeddable HTML fragments.

use serde::Serialize;
use ulid::Ulid;

use super::figure::Figure;

/// Height used when a figure does not set one, matching Plotly's default.
const DEFAULT_HEIGHT: u32 = 450;

/// A chart ready to be embedded in a page that loads Plotly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedChart {
    /// Stable identifier of the chart slot, e.g. `genre_chart`.
    pub name: &'static str,
    pub title: String,
    /// A `<div>` plus the `<script>` that draws into it.
    #[serde(skip)]
    pub html: String,
    /// Whether this is a placeholder standing in for a chart that failed.
    pub placeholder: bool,
}

/// JSON safe to inline in a `<script>` element.
fn script_json(value: &impl Serialize) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Render `figure` into an HTML fragment.
///
/// # Errors
///
/// Returns an error if the figure cannot be serialized.
pub fn render(name: &'static str, figure: &Figure) -> Result<RenderedChart, serde_json::Error> {
    let id = Ulid::new().to_string().to_lowercase();
    let height = figure.layout.height.unwrap_or(DEFAULT_HEIGHT);
    let data = script_json(&figure.data)?;
    let layout = script_json(&figure.layout)?;

    let html = format!(
        r#"<div class="chart" data-chart="{name}">
<div id="{id}" class="plotly-graph-div" style="height:{height}px; width:100%;"></div>
<script type="text/javascript">
if (document.getElementById("{id}")) {{
    Plotly.newPlot("{id}", {data}, {layout}, {{"responsive": true, "displaylogo": false}});
}}
</script>
</div>"#
    );

    Ok(RenderedChart {
        name,
        title: figure
            .layout
            .title
            .as_ref()
            .map(|t| t.text.clone())
            .unwrap_or_default(),
        html,
        placeholder: false,
    })
}

/// The last resort when even a placeholder figure cannot be rendered.
#[must_use]
pub fn error_fragment(name: &'static str, label: &str) -> RenderedChart {
    let label = escape_html(label);
    RenderedChart {
        name,
        title: label.clone(),
        html: format!(
            r#"<div class="chart error-message" data-chart="{name}">Error loading {label}</div>"#
        ),
        placeholder: true,
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::figure::{Layout, Trace};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_embeds_figure() {
        let figure = Figure::new(Layout::titled("Top Genres").height(600))
            .with_trace(Trace::bar(vec!["pop".to_string()], vec![2_usize]));

        let chart = render("genre_chart", &figure).unwrap();

        assert_eq!(chart.name, "genre_chart");
        assert_eq!(chart.title, "Top Genres");
        assert!(!chart.placeholder);
        assert!(chart.html.contains("height:600px"));
        assert!(chart.html.contains(r#"Plotly.newPlot("#));
        assert!(chart.html.contains(r#"[{"type":"bar","x":["pop"],"y":[2]}]"#));
    }

    #[test]
    fn test_render_escapes_closing_tags() {
        let figure = Figure::new(Layout::titled("</script><script>alert(1)"));
        let chart = render("x", &figure).unwrap();
        assert!(!chart.html.contains("</script><script>"));
        assert!(chart.html.contains(r"<\/script>"));
    }

    #[test]
    fn test_each_render_gets_its_own_div() {
        let figure = Figure::default();
        let a = render("x", &figure).unwrap();
        let b = render("x", &figure).unwrap();
        assert_ne!(a.html, b.html);
    }

    #[test]
    fn test_error_fragment() {
        let chart = error_fragment("genre_chart", "genre <distribution>");
        assert!(chart.placeholder);
        assert_eq!(
            chart.html,
            r#"<div class="chart error-message" data-chart="genre_chart">Error loading genre &lt;distribution&gt;</div>"#
        );
    }
}
