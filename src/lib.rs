// Library exports for scatter-vector

pub mod brush;
pub mod compiler;
pub mod csv_reader;
pub mod data;
pub mod error;
pub mod graph;
pub mod ir;
pub mod layout;
pub mod logging;
pub mod palette;
pub mod parser;
pub mod resolve;
pub mod runtime;
pub mod scale;

pub use brush::{Extent, PixelRect, Transition};
pub use data::{DataSource, Dataset, FileSource, MemorySource, Row};
pub use error::{ConfigurationError, DrawError, LoadError};
pub use runtime::{DrawRequest, Phase, ScatterVector};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    Png,
    #[serde(rename = "svg")]
    #[default]
    Svg,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
    /// Room left of the grid for the primary axis labels.
    #[serde(default = "default_margin_left")]
    pub margin_left: u32,
}

fn default_margin_left() -> u32 { 50 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Svg,
            margin_left: 50,
        }
    }
}

/// Construction parameters of a scatterplot vector.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ScatterVectorConfig {
    /// Data source, resolved by a `DataSource` on first draw.
    #[serde(default)]
    pub url: String,
    /// Panel edge length in pixels.
    #[serde(default = "default_size")]
    pub size: u32,
    /// Inset within each panel.
    #[serde(default = "default_padding")]
    pub padding: u32,
    /// Categorical columns forming the group key.
    #[serde(default)]
    pub factors: Vec<String>,
    /// Numeric columns that can be plotted.
    #[serde(default)]
    pub values: Vec<String>,
}

fn default_size() -> u32 { 140 }
fn default_padding() -> u32 { 10 }

impl ScatterVectorConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            size: default_size(),
            padding: default_padding(),
            factors: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn with_factors<S: Into<String>>(mut self, factors: impl IntoIterator<Item = S>) -> Self {
        self.factors = factors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_values<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Parse a JSON configuration object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ScatterVectorConfig::from_json(r#"{"url": "iris.csv", "factors": ["species"]}"#)
            .unwrap();
        assert_eq!(config.size, 140);
        assert_eq!(config.padding, 10);
        assert_eq!(config.factors, vec!["species"]);
        assert!(config.values.is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = ScatterVectorConfig::new("x.csv")
            .with_values(["a", "b"])
            .with_size(200)
            .with_padding(20);
        assert_eq!(config.values, vec!["a", "b"]);
        assert_eq!((config.size, config.padding), (200, 20));
    }

    #[test]
    fn test_render_options_format() {
        let options: RenderOptions = serde_json::from_str(r#"{"type": "png"}"#).unwrap();
        assert_eq!(options.format, OutputFormat::Png);
        assert_eq!(options.margin_left, 50);
    }
}
