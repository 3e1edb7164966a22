//! Node transport errors.

/// Errors reported by a single cache node.
///
/// The distinction matters to the cluster: `Unreachable` removes the node
/// from the active set, `Command` does not.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NodeError {
    /// Connection refused, dropped, timed out, or the pool could not hand out
    /// a connection.
    #[error("Cache node {node} unreachable: {message}")]
    Unreachable { node: String, message: String },

    /// The node answered but the command failed.
    #[error("Cache node {node} command failed: {message}")]
    Command { node: String, message: String },

    /// The node configuration is unusable.
    #[error("Cache node {node} configuration error: {message}")]
    Config { node: String, message: String },
}

impl NodeError {
    /// Creates a new `Unreachable` error.
    #[must_use]
    pub fn unreachable(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unreachable {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Command` error.
    #[must_use]
    pub fn command(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Config` error.
    #[must_use]
    pub fn config(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            node: node.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if the node should be dropped from the cluster.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// Result type alias for node operations.
pub type NodeResult<T> = std::result::Result<T, NodeError>;
