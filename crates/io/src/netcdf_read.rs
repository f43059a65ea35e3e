//! Low-level NetCDF extraction helpers.

use std::path::Path;

use decadal_calendar::{CalendarDate, CfCalendar, TimeUnits};
use netcdf::AttributeValue;

use crate::error::IoError;

/// Open a NetCDF file at `path`, returning [`IoError::FileNotFound`] if the
/// path does not exist on disk.
pub(crate) fn open_file(path: &Path) -> Result<netcdf::File, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    netcdf::open(path).map_err(|e| IoError::Netcdf {
        reason: format!("{}: {e}", path.display()),
    })
}

/// Look up a variable, trying each alias in order.
///
/// If none match, returns [`IoError::MissingVariable`] with the first alias
/// as the name.
pub(crate) fn find_variable<'f>(
    file: &'f netcdf::File,
    aliases: &[String],
    path: &Path,
) -> Result<netcdf::Variable<'f>, IoError> {
    for alias in aliases {
        if let Some(var) = file.variable(alias) {
            return Ok(var);
        }
    }

    let name = aliases.first().map_or("unknown", String::as_str);
    Err(IoError::MissingVariable {
        name: name.to_string(),
        path: path.to_path_buf(),
    })
}

/// Read a 1-D `f64` variable, trying each alias in order.
pub(crate) fn read_1d_f64(
    file: &netcdf::File,
    aliases: &[String],
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    let var = find_variable(file, aliases, path)?;
    if var.dimensions().len() != 1 {
        return Err(IoError::DimensionMismatch {
            name: format!("{} dimensions", var.name()),
            expected: 1,
            got: var.dimensions().len(),
        });
    }
    Ok(var.get_values::<f64, _>(..)?)
}

/// Read a string attribute, `None` if it is absent.
pub(crate) fn string_attribute(
    var: &netcdf::Variable<'_>,
    name: &str,
) -> Result<Option<String>, IoError> {
    let Some(value) = var.attribute_value(name) else {
        return Ok(None);
    };
    let value = value.map_err(|e| IoError::Netcdf {
        reason: format!("failed to read '{name}' attribute of '{}': {e}", var.name()),
    })?;
    match value {
        AttributeValue::Str(s) => Ok(Some(s)),
        other => Err(IoError::Netcdf {
            reason: format!(
                "'{name}' attribute of '{}' is not a string: {other:?}",
                var.name()
            ),
        }),
    }
}

fn numeric_attribute(var: &netcdf::Variable<'_>, name: &str) -> Option<f64> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Longlong(v) => Some(v as f64),
        AttributeValue::Doubles(v) => v.first().copied(),
        AttributeValue::Floats(v) => v.first().map(|&f| f64::from(f)),
        _ => None,
    }
}

/// Values declared missing through `_FillValue` or `missing_value`.
pub(crate) fn missing_markers(var: &netcdf::Variable<'_>) -> Vec<f64> {
    ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| numeric_attribute(var, name))
        .collect()
}

/// Replace every value equal to a missing marker with `NaN`.
pub(crate) fn mask_missing(values: &mut [f64], markers: &[f64]) {
    if markers.is_empty() {
        return;
    }
    for v in values.iter_mut() {
        if markers.contains(v) {
            *v = f64::NAN;
        }
    }
}

/// Decode the time coordinate `time_var` into dates.
///
/// The calendar comes from the variable's `calendar` attribute, falling back
/// to `default_calendar` when absent.
pub(crate) fn read_time_axis(
    file: &netcdf::File,
    time_var: &str,
    default_calendar: CfCalendar,
    path: &Path,
) -> Result<Vec<CalendarDate>, IoError> {
    let invalid = |reason: String| IoError::InvalidTime {
        path: path.to_path_buf(),
        reason,
    };
    let var = file
        .variable(time_var)
        .ok_or_else(|| IoError::MissingVariable {
            name: time_var.to_string(),
            path: path.to_path_buf(),
        })?;

    let units = string_attribute(&var, "units")?
        .ok_or_else(|| invalid(format!("time variable '{time_var}' has no 'units' attribute")))?;
    let calendar = match string_attribute(&var, "calendar")? {
        Some(name) => CfCalendar::parse(&name).map_err(|e| invalid(e.to_string()))?,
        None => default_calendar,
    };
    let units = TimeUnits::parse(&units, calendar).map_err(|e| invalid(e.to_string()))?;

    let offsets = var.get_values::<f64, _>(..)?;
    units
        .decode_all(&offsets)
        .map_err(|e| invalid(e.to_string()))
}
