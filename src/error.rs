use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Page geometry or layout configuration that cannot hold any content.
    Configuration(String),
    /// The metrics provider could not measure `text` in `font`.
    MetricsUnavailable { font: String, text: String },
    /// A TrueType/OpenType face could not be parsed.
    Font(String),
    /// Document model JSON did not parse.
    Parse(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Invalid configuration: {msg}"),
            Error::MetricsUnavailable { font, text } => {
                write!(f, "Cannot measure {text:?} with font {font}")
            }
            Error::Font(msg) => write!(f, "Font error: {msg}"),
            Error::Parse(e) => write!(f, "Failed to parse document model: {e}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
