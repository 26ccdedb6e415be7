//! Chart configuration model.
//!
//! DESIGN
//! ======
//! `ChartConfiguration` is a plain value. Every accepted change builds a new
//! value that replaces the old one wholesale in the [`crate::state::ChartStore`];
//! nothing outside the store mutates a live configuration. Field names are
//! camelCase on the wire because the same JSON is shown to the LLM and read
//! back from it.
//!
//! Named setters are modeled as [`ChartAction`] variants so the store, the
//! HTTP layer, and tests share one vocabulary for manual edits.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChartError {
    #[error("series {series:?} missing from data point {index}")]
    SeriesMissing { series: String, index: usize },
    #[error("series {0:?} collides with the x-axis key")]
    SeriesIsAxisKey(String),
    #[error("unknown series: {0}")]
    UnknownSeries(String),
}

impl crate::error::ErrorCode for ChartError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SeriesMissing { .. } => "E_SERIES_MISSING",
            Self::SeriesIsAxisKey(_) => "E_SERIES_IS_AXIS_KEY",
            Self::UnknownSeries(_) => "E_UNKNOWN_SERIES",
        }
    }
}

// =============================================================================
// ENUMS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Combined,
}

/// Per-series mark type. Only consulted when the chart type is `combined`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    #[default]
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxis {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorPalette {
    #[default]
    Founder,
    Executive,
    Arctic,
    Revolut,
    Linear,
}

/// One of the six optional axis bounds on [`ChartStyling`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisBound {
    XMin,
    XMax,
    YMin,
    YMax,
    YMinRight,
    YMaxRight,
}

// =============================================================================
// DATA
// =============================================================================

/// A cell in a data point: either a number or a category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Number(serde_json::Number),
    Text(String),
}

impl DataValue {
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        Self::Number(v.into())
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        serde_json::Number::from_f64(v).map_or_else(|| Self::Text(v.to_string()), Self::Number)
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

/// One row of chart data: field name → value. Includes the x-axis field.
/// Fields keep the order they were inserted or received in.
pub type DataPoint = IndexMap<String, DataValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub data_points: Vec<DataPoint>,
    pub x_axis_key: String,
    pub series_names: Vec<String>,
    /// What the data is, where it came from, and what the user wants from it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// =============================================================================
// STYLING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesColor {
    #[serde(rename = "gradient")]
    pub gradient_id: String,
    #[serde(rename = "solid")]
    pub solid_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartStyling {
    pub chart_type: ChartType,
    pub series_types: BTreeMap<String, SeriesType>,
    pub series_y_axis: BTreeMap<String, YAxis>,
    pub series_colors: Vec<SeriesColor>,
    pub hidden_series: Vec<String>,
    pub show_data_labels: bool,
    pub title: String,
    pub subtitle: String,
    pub selected_palette: ColorPalette,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_min_right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_max_right: Option<f64>,
}

impl ChartStyling {
    /// Mark type for a series; missing entries render as bars.
    #[must_use]
    pub fn series_type(&self, series: &str) -> SeriesType {
        self.series_types.get(series).copied().unwrap_or_default()
    }

    /// Y-axis for a series; missing entries go on the left axis.
    #[must_use]
    pub fn series_axis(&self, series: &str) -> YAxis {
        self.series_y_axis.get(series).copied().unwrap_or_default()
    }

    fn bound_mut(&mut self, bound: AxisBound) -> &mut Option<f64> {
        match bound {
            AxisBound::XMin => &mut self.x_min,
            AxisBound::XMax => &mut self.x_max,
            AxisBound::YMin => &mut self.y_min,
            AxisBound::YMax => &mut self.y_max,
            AxisBound::YMinRight => &mut self.y_min_right,
            AxisBound::YMaxRight => &mut self.y_max_right,
        }
    }
}

/// A series as the renderer draws it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesLayout {
    pub name: String,
    pub series_type: SeriesType,
    pub axis: YAxis,
    pub hidden: bool,
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfiguration {
    pub data: ChartData,
    pub styling: ChartStyling,
}

impl ChartConfiguration {
    /// The configuration a fresh session starts with: quarterly sales for
    /// four products.
    #[must_use]
    pub fn sample() -> Self {
        let rows: [(&str, [i64; 4]); 4] = [
            ("Q1", [240, 139, 120, 180]),
            ("Q2", [300, 200, 150, 220]),
            ("Q3", [200, 278, 190, 250]),
            ("Q4", [278, 189, 240, 300]),
        ];
        let series: Vec<String> = ["Product A", "Product B", "Product C", "Product D"]
            .into_iter()
            .map(String::from)
            .collect();

        let data_points = rows
            .iter()
            .map(|(quarter, values)| {
                let mut point = DataPoint::new();
                point.insert("quarter".into(), DataValue::from(*quarter));
                for (name, value) in series.iter().zip(values) {
                    point.insert(name.clone(), DataValue::from(*value));
                }
                point
            })
            .collect();

        let series_colors = [
            ("colorA", "hsl(262, 80%, 60%)"),
            ("colorB", "hsl(199, 89%, 48%)"),
            ("colorC", "hsl(142, 71%, 45%)"),
            ("colorD", "hsl(280, 65%, 60%)"),
        ]
        .into_iter()
        .map(|(gradient, solid)| SeriesColor { gradient_id: gradient.into(), solid_color: solid.into() })
        .collect();

        Self {
            data: ChartData {
                data_points,
                x_axis_key: "quarter".into(),
                series_names: series.clone(),
                description: None,
            },
            styling: ChartStyling {
                chart_type: ChartType::Bar,
                series_types: series.iter().map(|s| (s.clone(), SeriesType::Bar)).collect(),
                series_y_axis: series.iter().map(|s| (s.clone(), YAxis::Left)).collect(),
                series_colors,
                title: "Quarterly Performance".into(),
                subtitle: "Sales by product across Q1-Q4".into(),
                ..ChartStyling::default()
            },
        }
    }

    /// Check that every series is a non-axis field present in every data point.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ChartError> {
        for series in &self.data.series_names {
            if *series == self.data.x_axis_key {
                return Err(ChartError::SeriesIsAxisKey(series.clone()));
            }
            if let Some(index) = self
                .data
                .data_points
                .iter()
                .position(|point| !point.contains_key(series))
            {
                return Err(ChartError::SeriesMissing { series: series.clone(), index });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn has_series(&self, series: &str) -> bool {
        self.data.series_names.iter().any(|s| s == series)
    }

    /// Series not hidden by the legend, in declaration order.
    #[must_use]
    pub fn visible_series(&self) -> Vec<String> {
        self.data
            .series_names
            .iter()
            .filter(|s| !self.styling.hidden_series.contains(s))
            .cloned()
            .collect()
    }

    /// Every series with its mark type and axis resolved, for rendering.
    #[must_use]
    pub fn series_layout(&self) -> Vec<SeriesLayout> {
        self.data
            .series_names
            .iter()
            .map(|name| SeriesLayout {
                name: name.clone(),
                series_type: self.styling.series_type(name),
                axis: self.styling.series_axis(name),
                hidden: self.styling.hidden_series.contains(name),
            })
            .collect()
    }

    /// Hide a visible series or show a hidden one.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::UnknownSeries`] (and changes nothing) when the
    /// name is not one of the chart's series.
    pub fn toggle_series(&mut self, series: &str) -> Result<(), ChartError> {
        self.require_series(series)?;
        let hidden = &mut self.styling.hidden_series;
        if let Some(pos) = hidden.iter().position(|s| s == series) {
            hidden.remove(pos);
        } else {
            hidden.push(series.to_owned());
        }
        Ok(())
    }

    /// Drop hidden entries that no longer name a series, and duplicates.
    pub fn normalize_hidden_series(&mut self) {
        let names = &self.data.series_names;
        let mut seen = Vec::with_capacity(self.styling.hidden_series.len());
        self.styling.hidden_series.retain(|s| {
            if !names.contains(s) || seen.contains(s) {
                return false;
            }
            seen.push(s.clone());
            true
        });
    }

    fn require_series(&self, series: &str) -> Result<(), ChartError> {
        if self.has_series(series) { Ok(()) } else { Err(ChartError::UnknownSeries(series.to_owned())) }
    }
}

// =============================================================================
// MANUAL EDITS
// =============================================================================

/// A named manual edit, applied by the store to a copy of the live
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ChartAction {
    SetChartType { chart_type: ChartType },
    ToggleDataLabels,
    ToggleSeries { series: String },
    SetPalette { palette: ColorPalette },
    SetTitle { title: String },
    SetSubtitle { subtitle: String },
    SetSeriesType { series: String, series_type: SeriesType },
    SetSeriesAxis { series: String, axis: YAxis },
    SetAxisRange { bound: AxisBound, value: Option<f64> },
    Reset,
}

impl ChartAction {
    /// Apply the edit in place.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::UnknownSeries`] for per-series edits naming a
    /// series the chart does not have. The configuration is unchanged then.
    pub fn apply(self, config: &mut ChartConfiguration) -> Result<(), ChartError> {
        match self {
            Self::SetChartType { chart_type } => config.styling.chart_type = chart_type,
            Self::ToggleDataLabels => config.styling.show_data_labels = !config.styling.show_data_labels,
            Self::ToggleSeries { series } => config.toggle_series(&series)?,
            Self::SetPalette { palette } => config.styling.selected_palette = palette,
            Self::SetTitle { title } => config.styling.title = title,
            Self::SetSubtitle { subtitle } => config.styling.subtitle = subtitle,
            Self::SetSeriesType { series, series_type } => {
                config.require_series(&series)?;
                config.styling.series_types.insert(series, series_type);
            }
            Self::SetSeriesAxis { series, axis } => {
                config.require_series(&series)?;
                config.styling.series_y_axis.insert(series, axis);
            }
            Self::SetAxisRange { bound, value } => *config.styling.bound_mut(bound) = value,
            Self::Reset => *config = ChartConfiguration::sample(),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "chart_test.rs"]
mod tests;
