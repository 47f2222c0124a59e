use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("skeleton has no bones")]
    EmptySkeleton,

    #[error("bone '{bone}' (index {index}) has invalid parent {parent:?}")]
    InvalidBoneParent {
        bone: String,
        index: usize,
        parent: Option<usize>,
    },

    #[error("animation '{clip}' has {tracks} bone tracks but the skeleton has {bones} bones")]
    TrackCountMismatch {
        clip: String,
        tracks: usize,
        bones: usize,
    },

    #[error("{track} keys for bone {bone} in animation '{clip}' are not ordered by time")]
    UnorderedKeys {
        clip: String,
        bone: usize,
        track: &'static str,
    },

    #[error("missing animation: {name}")]
    MissingAnimation { name: String },

    #[error("invalid state index {index} (state count {count})")]
    InvalidStateIndex { index: usize, count: usize },

    #[error("unknown asset: {name}")]
    UnknownAsset { name: String },

    #[error("asset handle no longer refers to a cached asset")]
    StaleHandle,

    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[cfg(feature = "json")]
    #[error("failed to parse JSON: {message}")]
    JsonParse { message: String },

    #[cfg(feature = "json")]
    #[error("unknown parent bone '{parent}' for bone '{bone}'")]
    JsonUnknownBoneParent { bone: String, parent: String },

    #[cfg(feature = "json")]
    #[error("unknown event '{event}' referenced by animation '{animation}'")]
    JsonUnknownEvent { animation: String, event: String },

    #[cfg(feature = "binary")]
    #[error("failed to parse binary asset: {message}")]
    BinaryParse { message: String },
}
