//! Configuration for loading single runs.

use crate::error::ArchiveError;

/// Configuration for the single-run loader.
///
/// Use the builder methods to customise parameters.
///
/// # Example
///
/// ```
/// use decadal_archive::LoadConfig;
///
/// let config = LoadConfig::new("tas").with_init_year_marker("dkfen4");
///
/// assert_eq!(config.field(), "tas");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    /// Name of the scalar field to extract.
    field: String,
    /// Token that precedes the four-digit initialization year in file names.
    init_year_marker: Option<String>,
}

impl LoadConfig {
    /// Creates a configuration extracting `field`, with no file-name check.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            init_year_marker: None,
        }
    }

    /// Enables the file-name cross-check.
    ///
    /// The four digits following `marker` in each input's file name must
    /// equal the initialization year derived from its time axis.
    pub fn with_init_year_marker(mut self, marker: impl Into<String>) -> Self {
        self.init_year_marker = Some(marker.into());
        self
    }

    /// Returns the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the file-name marker, if the cross-check is enabled.
    pub fn init_year_marker(&self) -> Option<&str> {
        self.init_year_marker.as_deref()
    }

    /// Validates this configuration.
    ///
    /// Returns an error if the field name or marker is blank.
    pub fn validate(&self) -> Result<(), ArchiveError> {
        let mut problems = Vec::new();
        if self.field.trim().is_empty() {
            problems.push("field name is empty".to_string());
        }
        if let Some(marker) = &self.init_year_marker
            && marker.trim().is_empty()
        {
            problems.push("init_year_marker is empty".to_string());
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ArchiveError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            })
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self::new("tas")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = LoadConfig::default();
        assert_eq!(cfg.field(), "tas");
        assert_eq!(cfg.init_year_marker(), None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let cfg = LoadConfig::new("pr").with_init_year_marker("dkfen4");
        assert_eq!(cfg.field(), "pr");
        assert_eq!(cfg.init_year_marker(), Some("dkfen4"));
    }

    #[test]
    fn test_blank_field_rejected() {
        let err = LoadConfig::new("  ").validate().unwrap_err();
        assert_eq!(
            err,
            ArchiveError::Validation {
                count: 1,
                details: "field name is empty".to_string(),
            }
        );
    }

    #[test]
    fn test_collects_every_problem() {
        let err = LoadConfig::new("")
            .with_init_year_marker("")
            .validate()
            .unwrap_err();
        match err {
            ArchiveError::Validation { count, details } => {
                assert_eq!(count, 2);
                assert!(details.contains("field name"));
                assert!(details.contains("init_year_marker"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
