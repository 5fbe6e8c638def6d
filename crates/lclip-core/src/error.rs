use std::path::PathBuf;

use crate::codec::CodecError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("store file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {} is not a valid label mapping: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("could not determine the home directory; set LCLIP_PATH to choose a store file")]
    HomeDirNotFound,
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from malformed store content rather than
    /// from the filesystem.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
