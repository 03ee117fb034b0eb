//! Error types for the simulation engines

use thiserror::Error;

/// Invalid or inconsistent simulation input.
///
/// Raised before any computation proceeds; the engines never return
/// partial results alongside one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("non-finite result while computing {context}")]
    NonFinite { context: String },
}

impl ConfigurationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    /// Field name for `InvalidParameter`, `None` otherwise
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigurationError::InvalidParameter { field, .. } => Some(field),
            ConfigurationError::NonFinite { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Fail with `NonFinite` unless every value is finite
pub(crate) fn ensure_finite(context: impl FnOnce() -> String, values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ConfigurationError::NonFinite { context: context() })
    }
}
