use crate::id::LayerId;

/// Errors surfaced by the editing core.
///
/// Degenerate *inputs* (stale ids, empty regions, out-of-range factors) are
/// clamped or treated as no-ops and never reach this type; the variants here
/// cover collaborator failures and genuine misuse of the API.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A layer id that is not present in the scene.
    #[error("layer {0} does not exist in the scene")]
    UnknownLayer(LayerId),

    /// The item codec collaborator failed to serialize an item.
    #[error("item serialization failed: {0}")]
    Serialize(String),

    /// The item codec collaborator failed to deserialize a snapshot.
    #[error("item deserialization failed: {0}")]
    Deserialize(String),
}
