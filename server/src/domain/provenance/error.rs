use thiserror::Error;

use crate::data::proxy::ProxyError;

#[derive(Error, Debug)]
pub enum ProvenanceError {
    /// A collaborator call failed; the whole build is abandoned
    #[error("Upstream trace service failed: {0}")]
    Upstream(#[from] ProxyError),

    /// The upstream trace contradicts itself or lacks required records
    #[error("Inconsistent trace: {0}")]
    InvariantViolation(String),
}

impl ProvenanceError {
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }
}
