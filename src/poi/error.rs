use thiserror::Error;

/// Reasons a heading cannot become a POI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoiError {
    #[error("heading has no id")]
    MissingAnchorId,
    #[error("heading id `{0}` is already registered")]
    DuplicateAnchorId(String),
    #[error("no element with id `{0}` in the document")]
    UnresolvedAnchor(String),
}
