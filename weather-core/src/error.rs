use std::fmt;

use thiserror::Error;

use crate::model::{ExternalId, LocationId};
use crate::store::MAX_LOCATIONS;

/// Which upstream HTTP service a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamService {
    Geonames,
    Weather,
}

impl UpstreamService {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamService::Geonames => "Geonames",
            UpstreamService::Weather => "Weather",
        }
    }
}

impl fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way a workflow can fail. All of them end the current request.
///
/// The `Display` text is what the user sees on the error page; anything
/// more detailed (HTTP status, parse error, I/O error) stays in the
/// variant fields and is only logged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Could not connect to {service} API.")]
    UpstreamUnavailable {
        service: UpstreamService,
        detail: String,
    },

    #[error("The requested location does not exist.")]
    NotFound(LocationId),

    #[error(
        "A maximum of {} locations are supported. Please remove a location and try again.",
        MAX_LOCATIONS
    )]
    CapacityExceeded,

    #[error("The selected location already exists in the location list.")]
    Duplicate(ExternalId),

    #[error("'{0}' is not a valid location identifier.")]
    InvalidExternalId(String),

    #[error("The location store could not be accessed.")]
    Storage(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn upstream(service: UpstreamService, detail: impl Into<String>) -> Self {
        AppError::UpstreamUnavailable {
            service,
            detail: detail.into(),
        }
    }

    pub fn storage(detail: impl fmt::Display) -> Self {
        AppError::Storage(detail.to_string())
    }

    /// Extra information for logs, if the variant carries any.
    pub fn detail(&self) -> Option<String> {
        match self {
            AppError::UpstreamUnavailable { detail, .. } => Some(detail.clone()),
            AppError::NotFound(id) => Some(format!("no location with id {id}")),
            AppError::Duplicate(gid) => Some(format!("external id {gid} already stored")),
            AppError::Storage(detail) => Some(detail.clone()),
            AppError::CapacityExceeded | AppError::InvalidExternalId(_) => None,
        }
    }

    /// Errors caused by the user's request rather than by a broken collaborator.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::CapacityExceeded
                | AppError::Duplicate(_)
                | AppError::InvalidExternalId(_)
                | AppError::NotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages_are_fixed() {
        assert_eq!(
            AppError::CapacityExceeded.to_string(),
            "A maximum of 5 locations are supported. Please remove a location and try again."
        );
        assert_eq!(
            AppError::Duplicate(ExternalId(42)).to_string(),
            "The selected location already exists in the location list."
        );
    }

    #[test]
    fn upstream_message_hides_detail() {
        let err = AppError::upstream(UpstreamService::Weather, "connection refused");
        assert_eq!(err.to_string(), "Could not connect to Weather API.");
        assert_eq!(err.detail().as_deref(), Some("connection refused"));
        assert!(!err.is_user_error());
    }
}
