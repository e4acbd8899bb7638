use std::path::PathBuf;

/// Errors surfaced by a mining invocation and its loader/exporter collaborators.
#[derive( Debug, thiserror::Error )]
pub enum MineError {
    /// Rejected before any computation starts.
    #[error( "invalid configuration: {reason}" )]
    Configuration { reason: String },

    /// Signals a bug in tidset construction or reuse, never a data problem.
    #[error( "internal invariant violated: {details}" )]
    InvariantViolation { details: String },

    #[error( "i/o error on {}: {source}", .path.display() )]
    Io { path: PathBuf, source: std::io::Error },

    #[error( "could not serialize: {0}" )]
    Serialization( #[from] serde_json::Error ),
}

impl MineError {
    pub fn configuration<S: Into<String>>( reason: S ) -> MineError {
	MineError::Configuration { reason: reason.into() }
    }

    pub fn invariant<S: Into<String>>( details: S ) -> MineError {
	MineError::InvariantViolation { details: details.into() }
    }

    pub fn io<P: Into<PathBuf>>( path: P, source: std::io::Error ) -> MineError {
	MineError::Io { path: path.into(), source }
    }
}
