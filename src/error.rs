use std::path::PathBuf;

/// Errors produced while loading or storing a document.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("file '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("file '{}' is not valid UTF-8", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no path set for document")]
    NoPath,
}

impl EditorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Title used when the error is shown to the user.
    pub fn title(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "File Error",
            _ => "Error",
        }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
