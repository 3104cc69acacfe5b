// SPDX-FileCopyrightText: 2024 Nomadic Labs <contact@nomadic-labs.com>
//
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

/// Failures of a contribution step.
///
/// Every variant is terminal for the contribution: the ceremony state is
/// either corrupt or the operator input is unusable, and nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A point string lacks the `0x` prefix, is not valid hex, or decodes to
    /// the wrong number of bytes.
    #[error("malformed point hex: {0}")]
    MalformedInput(String),

    /// The decoded bytes are not a valid compressed point of the group.
    #[error("bytes do not encode a valid {0} point")]
    InvalidEncoding(&'static str),

    /// The contributed secret is zero modulo the scalar field order, or could
    /// not be read as a base-10 integer.
    #[error("secret must be a nonzero base-10 integer modulo the scalar field order")]
    ZeroOrInvalidScalar,

    /// A declared power count is larger than the number of points supplied.
    #[error("declared {group} count {count} exceeds the {len} points available")]
    CountOutOfRange {
        group: &'static str,
        count: usize,
        len: usize,
    },

    /// Decoding failed for one element of a batch.
    #[error("{group} point at index {index}: {source}")]
    Point {
        group: &'static str,
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// The ceremony holds fewer transcripts than the requested index.
    #[error("transcript index {index} out of range ({len} transcripts)")]
    TranscriptIndex { index: usize, len: usize },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
