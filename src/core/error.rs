use thiserror::Error;

use super::types::ServiceLineId;

/// Errors that can occur while enriching invoices with service lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EnrichError {
    /// The store has no service line for this identifier.
    #[error("service line not found: {id}")]
    NotFound { id: ServiceLineId },

    /// The store failed to load the service line (unreachable, timed out, ...).
    #[error("failed to load service line {id}: {reason}")]
    Load { id: ServiceLineId, reason: String },

    /// Raw invoice data could not be decoded.
    #[error("invalid invoice data: {0}")]
    Data(String),
}

impl EnrichError {
    /// Identifier of the service line the error refers to, if any.
    pub fn service_line_id(&self) -> Option<&ServiceLineId> {
        match self {
            Self::NotFound { id } | Self::Load { id, .. } => Some(id),
            Self::Data(_) => None,
        }
    }

    /// Attach the identifier that was being resolved to a store error.
    pub(crate) fn from_store(id: &ServiceLineId, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound { id: id.clone() },
            StoreError::Unavailable(reason) => Self::Load {
                id: id.clone(),
                reason,
            },
        }
    }
}

/// Errors a [`ServiceLineStore`](super::ServiceLineStore) reports for a single lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No record exists for the requested identifier.
    #[error("no such service line")]
    NotFound,

    /// The backing storage could not answer.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_carry_the_identifier() {
        let id = ServiceLineId::new("zzz");
        let err = EnrichError::from_store(&id, StoreError::NotFound);
        assert_eq!(err, EnrichError::NotFound { id: id.clone() });
        assert_eq!(err.to_string(), "service line not found: zzz");

        let err = EnrichError::from_store(&id, StoreError::Unavailable("timeout".into()));
        assert_eq!(err.service_line_id(), Some(&id));
        assert_eq!(err.to_string(), "failed to load service line zzz: timeout");
    }

    #[test]
    fn data_errors_have_no_identifier() {
        assert!(EnrichError::Data("eof".into()).service_line_id().is_none());
    }
}
