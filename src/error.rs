use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Output path or attachment could not be read/written.
    Io(std::io::Error),
    /// Page assembly failed (should not happen for well-formed records).
    Pdf(String),
    /// An input document could not be loaded or combined.
    Merge(lopdf::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Pdf(msg) => write!(f, "PDF error: {msg}"),
            Error::Merge(e) => write!(f, "merge error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Pdf(_) => None,
            Error::Merge(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<lopdf::Error> for Error {
    fn from(e: lopdf::Error) -> Self {
        Error::Merge(e)
    }
}
