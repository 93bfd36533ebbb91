//! A typed subset of the Plotly figure schema.
//!
//! Only the attributes the dashboard uses are modeled. Unset attributes are left out of the
//! serialized JSON so Plotly's own defaults apply.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self {
            data: Vec::new(),
            layout,
        }
    }

    #[must_use]
    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.data.push(trace);
        self
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.data.push(trace);
    }

    /// A dashed vertical line across the plot at `x`, labeled at the top.
    pub fn add_vline(&mut self, x: f64, color: &str, label: String) {
        self.layout.shapes.push(Shape {
            kind: "line",
            xref: "x",
            yref: "paper",
            x0: x,
            x1: x,
            y0: 0.0,
            y1: 1.0,
            line: Line::new(color).dash("dash"),
        });
        self.layout.annotations.push(Annotation {
            text: label,
            x: Some(x),
            y: Some(1.0),
            xref: Some("x"),
            yref: Some("paper"),
            showarrow: false,
            yanchor: Some("bottom"),
            font: Some(Font::color(color)),
        });
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Bar,
    Scatter,
    Histogram,
    Violin,
}

/// Coordinates or labels along one axis.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Values {
    Numbers(Vec<f64>),
    /// Numbers with gaps, used to break line traces.
    Gapped(Vec<Option<f64>>),
    Counts(Vec<usize>),
    Labels(Vec<String>),
}

impl Values {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numbers(v) => v.len(),
            Self::Gapped(v) => v.len(),
            Self::Counts(v) => v.len(),
            Self::Labels(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<f64>> for Values {
    fn from(v: Vec<f64>) -> Self {
        Self::Numbers(v)
    }
}

impl From<Vec<Option<f64>>> for Values {
    fn from(v: Vec<Option<f64>>) -> Self {
        Self::Gapped(v)
    }
}

impl From<Vec<usize>> for Values {
    fn from(v: Vec<usize>) -> Self {
        Self::Counts(v)
    }
}

impl From<Vec<String>> for Values {
    fn from(v: Vec<String>) -> Self {
        Self::Labels(v)
    }
}

/// A single color, one value per point mapped through a colorscale, or one color per point.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ColorSpec {
    Single(String),
    Scaled(Vec<f64>),
    Each(Vec<String>),
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

impl Line {
    #[must_use]
    pub fn new(color: &str) -> Self {
        Self {
            color: Some(color.to_owned()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub const fn dash(mut self, dash: &'static str) -> Self {
        self.dash = Some(dash);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<Vec<(f64, String)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<Value>,
}

impl Marker {
    #[must_use]
    pub fn color(color: &str) -> Self {
        Self {
            color: Some(ColorSpec::Single(color.to_owned())),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn outline(mut self, line: Line) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub const fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub const fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }
}

/// One trace of any supported kind; attributes that do not apply to a kind are left unset.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Values>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Values>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbinsx: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textposition: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverinfo: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertext: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customdata: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meanline: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<String>,
}

impl Trace {
    fn of(kind: TraceKind) -> Self {
        Self {
            kind,
            x: None,
            y: None,
            name: None,
            mode: None,
            orientation: None,
            marker: None,
            line: None,
            opacity: None,
            width: None,
            nbinsx: None,
            text: None,
            textposition: None,
            hoverinfo: None,
            hovertext: None,
            customdata: None,
            hovertemplate: None,
            side: None,
            points: None,
            meanline: None,
            fillcolor: None,
        }
    }

    #[must_use]
    pub fn bar(x: impl Into<Values>, y: impl Into<Values>) -> Self {
        Self {
            x: Some(x.into()),
            y: Some(y.into()),
            ..Self::of(TraceKind::Bar)
        }
    }

    #[must_use]
    pub fn scatter(x: impl Into<Values>, y: impl Into<Values>, mode: &'static str) -> Self {
        Self {
            x: Some(x.into()),
            y: Some(y.into()),
            mode: Some(mode),
            ..Self::of(TraceKind::Scatter)
        }
    }

    #[must_use]
    pub fn histogram(x: impl Into<Values>, nbins: usize) -> Self {
        Self {
            x: Some(x.into()),
            nbinsx: Some(nbins),
            ..Self::of(TraceKind::Histogram)
        }
    }

    #[must_use]
    pub fn violin(x: impl Into<Values>, name: impl Into<String>) -> Self {
        Self {
            x: Some(x.into()),
            name: Some(name.into()),
            ..Self::of(TraceKind::Violin)
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn orientation(mut self, orientation: &'static str) -> Self {
        self.orientation = Some(orientation);
        self
    }

    #[must_use]
    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    #[must_use]
    pub fn line(mut self, line: Line) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub const fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    #[must_use]
    pub const fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn text(mut self, text: Vec<String>) -> Self {
        self.text = Some(text);
        self
    }

    #[must_use]
    pub const fn textposition(mut self, position: &'static str) -> Self {
        self.textposition = Some(position);
        self
    }

    #[must_use]
    pub const fn hoverinfo(mut self, hoverinfo: &'static str) -> Self {
        self.hoverinfo = Some(hoverinfo);
        self
    }

    #[must_use]
    pub fn hovertext(mut self, hovertext: Vec<String>) -> Self {
        self.hovertext = Some(hovertext);
        self
    }

    #[must_use]
    pub fn customdata(mut self, customdata: Vec<Value>) -> Self {
        self.customdata = Some(customdata);
        self
    }

    #[must_use]
    pub fn hovertemplate(mut self, template: impl Into<String>) -> Self {
        self.hovertemplate = Some(template.into());
        self
    }

    #[must_use]
    pub const fn side(mut self, side: &'static str) -> Self {
        self.side = Some(side);
        self
    }

    #[must_use]
    pub const fn points(mut self, points: &'static str) -> Self {
        self.points = Some(points);
        self
    }

    #[must_use]
    pub fn meanline(mut self, meanline: Value) -> Self {
        self.meanline = Some(meanline);
        self
    }

    #[must_use]
    pub fn fillcolor(mut self, color: &str) -> Self {
        self.fillcolor = Some(color.to_owned());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<&'static str>,
}

impl Font {
    #[must_use]
    pub fn color(color: &str) -> Self {
        Self {
            color: Some(color.to_owned()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Title {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

impl Title {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridwidth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zerolinecolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorange: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zeroline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showticklabels: Option<bool>,
}

impl Axis {
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(Title::new(title)),
            ..Self::default()
        }
    }

    /// An axis with no grid, zero line, or tick labels.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            showgrid: Some(false),
            zeroline: Some(false),
            showticklabels: Some(false),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct HoverLabel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Legend {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yanchor: Option<&'static str>,
}

impl Legend {
    #[must_use]
    pub const fn top_left() -> Self {
        Self {
            bgcolor: None,
            font: None,
            x: Some(0.01),
            y: Some(0.99),
            xanchor: Some("left"),
            yanchor: Some("top"),
        }
    }

    #[must_use]
    pub const fn top_right() -> Self {
        Self {
            bgcolor: None,
            font: None,
            x: Some(0.99),
            y: Some(0.99),
            xanchor: Some("right"),
            yanchor: Some("top"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub xref: &'static str,
    pub yref: &'static str,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub line: Line,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Annotation {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xref: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yref: Option<&'static str>,
    pub showarrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yanchor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bargap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverdistance: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clickmode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverlabel: Option<HoverLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violingap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violingroupgap: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Layout {
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(Title::new(title)),
            ..Self::default()
        }
    }

    /// Point-precise hovering and click-to-select, shared by the interactive charts.
    #[must_use]
    pub const fn interactive(mut self) -> Self {
        self.hovermode = Some("closest");
        self.hoverdistance = Some(100);
        self.clickmode = Some("event+select");
        self
    }

    #[must_use]
    pub fn axes(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.xaxis = Axis::titled(x);
        self.yaxis = Axis::titled(y);
        self
    }

    #[must_use]
    pub const fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    #[must_use]
    pub const fn bargap(mut self, bargap: f64) -> Self {
        self.bargap = Some(bargap);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_unset_attributes_are_omitted() {
        let trace = Trace::bar(vec!["pop".to_string()], vec![3_usize]).name("Genres");
        assert_eq!(
            serde_json::to_value(&trace).unwrap(),
            json!({"type": "bar", "x": ["pop"], "y": [3], "name": "Genres"})
        );
    }

    #[test]
    fn test_gaps_serialize_as_null() {
        let trace = Trace::scatter(vec![Some(0.0), Some(1.0), None], vec![Some(1.0), Some(0.0), None], "lines");
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(value["x"], json!([0.0, 1.0, null]));
        assert_eq!(value["mode"], json!("lines"));
    }

    #[test]
    fn test_vline() {
        let mut figure = Figure::default();
        figure.add_vline(42.5, "#B3B3B3", "Mean: 42.5".into());

        let layout = serde_json::to_value(&figure.layout).unwrap();
        assert_eq!(
            layout["shapes"][0],
            json!({
                "type": "line", "xref": "x", "yref": "paper",
                "x0": 42.5, "x1": 42.5, "y0": 0.0, "y1": 1.0,
                "line": {"color": "#B3B3B3", "dash": "dash"}
            })
        );
        assert_eq!(layout["annotations"][0]["text"], json!("Mean: 42.5"));
    }
}
