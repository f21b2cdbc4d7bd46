//! Errors surfaced by island generation.

/// Errors returned by the sampler, the height pass and island assembly.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// The settings cannot produce a graph (bad bounds, or no room for a root).
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Human-readable description of the problem.
        reason: String,
    },

    /// Fewer than three nodes were produced, so no mesh can be built.
    #[error("insufficient nodes for triangulation: found {found}, need at least 3")]
    InsufficientNodes {
        /// Number of nodes in the sampled graph.
        found: usize,
    },

    /// The triangulator rejected the point set.
    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

impl GenerationError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
