//! Error types for prosediff.
//!
//! Diffing, reconciliation and semantic comparison never fail on string
//! input. Errors only arise at the edges: loading documents, rendering
//! reports and applying patches.

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read standard input: {source}")]
    StdinError {
        #[source]
        source: std::io::Error,
    },

    #[error("Standard input can only be used for one document")]
    StdinReused,
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Unknown output format: {format}")]
    UnknownFormat { format: String },

    #[error("Failed to serialize to JSON: {source}")]
    JsonSerializationError {
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("Patch expects {expected:?} at offset {offset}, found {found:?}")]
    DeletionMismatch {
        offset: usize,
        expected: String,
        found: String,
    },

    #[error("Patch reaches offset {offset} but the source has only {len} chars")]
    OutOfBounds { offset: usize, len: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ProsediffError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Patch(#[from] PatchError),
}

impl InputError {
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn read_error(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }
}

impl PatchError {
    pub fn deletion_mismatch(
        offset: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::DeletionMismatch {
            offset,
            expected: expected.into(),
            found: found.into(),
        }
    }
}
