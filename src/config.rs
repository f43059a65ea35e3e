use std::path::PathBuf;

use serde::Deserialize;

/// Top-level `decadal.toml` configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecadalConfig {
    /// Which runs to read.
    #[serde(default)]
    pub input: InputToml,

    /// NetCDF reader settings.
    #[serde(default)]
    pub reader: ReaderToml,

    /// Archive output settings.
    #[serde(default)]
    pub output: OutputToml,

    /// Optional lead-year anomaly output.
    #[serde(default)]
    pub anomaly: Option<AnomalyToml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputToml {
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default)]
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub init_year_marker: Option<String>,
}

impl Default for InputToml {
    fn default() -> Self {
        Self {
            field: default_field(),
            files: Vec::new(),
            init_year_marker: None,
        }
    }
}

fn default_field() -> String {
    "tas".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReaderToml {
    #[serde(default = "default_time_var")]
    pub time_var: String,
    #[serde(default = "default_calendar")]
    pub default_calendar: String,
    #[serde(default)]
    pub lat_aliases: Option<Vec<String>>,
    #[serde(default)]
    pub lon_aliases: Option<Vec<String>>,
}

impl Default for ReaderToml {
    fn default() -> Self {
        Self {
            time_var: default_time_var(),
            default_calendar: default_calendar(),
            lat_aliases: None,
            lon_aliases: None,
        }
    }
}

fn default_time_var() -> String {
    "time".to_string()
}
fn default_calendar() -> String {
    "standard".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputToml {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_fill_value")]
    pub fill_value: f64,
    #[serde(default)]
    pub valid_time: bool,
    #[serde(default)]
    pub deflate_level: Option<u8>,
}

impl Default for OutputToml {
    fn default() -> Self {
        Self {
            path: None,
            fill_value: default_fill_value(),
            valid_time: false,
            deflate_level: None,
        }
    }
}

fn default_fill_value() -> f64 {
    decadal_io::DEFAULT_FILL_VALUE
}

/// Anomalies of lead-year means against a reference grid.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnomalyToml {
    pub climatology: PathBuf,
    /// Variable in the climatology file; defaults to `[input].field`.
    #[serde(default)]
    pub field: Option<String>,
    pub output: PathBuf,
}
