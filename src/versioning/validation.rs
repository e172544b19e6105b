//! Input checks applied before the detector runs

use serde::{Deserialize, Serialize};

use super::errors::{VersionError, VersionResult};
use super::types::DocumentState;
use crate::storage::DEFAULT_LIST_LIMIT;

pub const MAX_TITLE_LEN: usize = 200;

/// Rejects states that may never be versioned.
pub fn validate_state(state: &DocumentState) -> VersionResult<()> {
    if state.title.trim().is_empty() {
        return Err(VersionError::Validation("title must not be empty".to_string()));
    }
    let title_len = state.title.chars().count();
    if title_len > MAX_TITLE_LEN {
        return Err(VersionError::Validation(format!(
            "title is {} characters, maximum is {}",
            title_len, MAX_TITLE_LEN
        )));
    }
    Ok(())
}

/// Page-size policy for history listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLimits {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

fn default_max_limit() -> usize {
    200
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl HistoryLimits {
    /// Resolves a requested page size: missing uses the default, oversized
    /// is clamped, zero is rejected.
    pub fn resolve(&self, requested: Option<usize>) -> VersionResult<usize> {
        match requested {
            None => Ok(self.default_limit.min(self.max_limit)),
            Some(0) => Err(VersionError::Validation("limit must be at least 1".to_string())),
            Some(n) => Ok(n.min(self.max_limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioning::errors::ErrorKind;
    use crate::versioning::types::Visibility;

    #[test]
    fn test_blank_title_rejected() {
        let err = validate_state(&DocumentState::new("   ", "", Visibility::Private)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    }

    #[test]
    fn test_long_title_rejected() {
        let title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(validate_state(&DocumentState::new(title, "", Visibility::Private)).is_err());
    }

    #[test]
    fn test_empty_content_allowed() {
        assert!(validate_state(&DocumentState::new("A", "", Visibility::Public)).is_ok());
    }

    #[test]
    fn test_limit_resolution() {
        let limits = HistoryLimits::default();
        assert_eq!(limits.resolve(None).unwrap(), 50);
        assert_eq!(limits.resolve(Some(10)).unwrap(), 10);
        assert_eq!(limits.resolve(Some(10_000)).unwrap(), 200);
        assert!(limits.resolve(Some(0)).is_err());
    }
}
