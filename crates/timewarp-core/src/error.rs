use std::fmt;

/// Machine-readable error codes for the host surface.
///
/// Reconstruction itself never fails; these cover the edges around it:
/// loading collaborator files, configuration, and argument handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FeedReadFailed,
    FeedParseError,
    ConfigParseError,
    InvalidArgument,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::FeedReadFailed => "E1001",
            Self::FeedParseError => "E1002",
            Self::ConfigParseError => "E2001",
            Self::InvalidArgument => "E3001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::FeedReadFailed => "Input file could not be read",
            Self::FeedParseError => "Input file is not valid JSON or JSON Lines",
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidArgument => "Invalid argument",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::FeedReadFailed => Some("Check the --events/--tasks paths and file permissions."),
            Self::FeedParseError => {
                Some("Provide a JSON array of records or one JSON object per line.")
            }
            Self::ConfigParseError => Some("Fix syntax in .timewarp.toml (or --config) and retry."),
            Self::InvalidArgument => Some("Run `tw --help` for accepted values."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
