//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result};

use decadal_archive::LoadConfig;
use decadal_calendar::CfCalendar;
use decadal_io::{ReaderConfig, WriterConfig};

use crate::config::{InputToml, OutputToml, ReaderToml};

/// Builds a [`LoadConfig`] from the TOML input configuration.
pub fn build_load_config(input: &InputToml) -> Result<LoadConfig> {
    let mut cfg = LoadConfig::new(&input.field);
    if let Some(ref marker) = input.init_year_marker {
        cfg = cfg.with_init_year_marker(marker);
    }
    cfg.validate().context("invalid [input] section")?;
    Ok(cfg)
}

/// Builds a [`ReaderConfig`] from the TOML reader configuration.
pub fn build_reader_config(reader: &ReaderToml) -> Result<ReaderConfig> {
    let calendar = CfCalendar::parse(&reader.default_calendar)
        .context("invalid [reader].default_calendar")?;
    let mut cfg = ReaderConfig::default()
        .with_time_var(&reader.time_var)
        .with_default_calendar(calendar);
    if let Some(ref aliases) = reader.lat_aliases {
        cfg = cfg.with_lat_aliases(aliases.clone());
    }
    if let Some(ref aliases) = reader.lon_aliases {
        cfg = cfg.with_lon_aliases(aliases.clone());
    }
    cfg.validate().context("invalid [reader] section")?;
    Ok(cfg)
}

/// Builds a [`WriterConfig`] from the TOML output configuration.
pub fn build_writer_config(output: &OutputToml) -> Result<WriterConfig> {
    let cfg = WriterConfig::default()
        .with_fill_value(output.fill_value)
        .with_deflate_level(output.deflate_level)
        .with_valid_time(output.valid_time);
    cfg.validate().context("invalid [output] section")?;
    Ok(cfg)
}
