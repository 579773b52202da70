//! Store read misses.

/// Expected, local read failure. Callers treat every variant as
/// "nothing happens this round".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Probabilistic variable lost its existence roll
    #[error("{name} is not real yet")]
    NotYetReal { name: String },

    /// Paradox variable read before its resolution time
    #[error("{name} is unresolved")]
    Unresolved { name: String },

    /// Name was never written to this store
    #[error("{name} is undefined")]
    Undefined { name: String },
}

impl StoreError {
    /// Variable the miss refers to
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::NotYetReal { name } | Self::Unresolved { name } | Self::Undefined { name } => name,
        }
    }
}
