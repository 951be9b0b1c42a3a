use core::fmt;

/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `uexky` can produce.
///
/// Every variant belongs to exactly one [`ErrorKind`], which tells the caller
/// whether the failure is theirs to fix ([`ErrorKind::Params`]), a transient
/// storage problem ([`ErrorKind::Internal`]), or a condition under which no
/// identifier may be issued at all ([`ErrorKind::Fatal`]).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The input is neither a valid storage integer nor a valid display
    /// string.
    #[error("invalid identifier: {input:?}")]
    InvalidIdentifier { input: String },

    /// A caller-supplied parameter was rejected.
    #[error("invalid params: {reason}")]
    Params { reason: String },

    /// The storage layer, clock, or a codec failed while serving an otherwise
    /// well-formed request.
    #[error("internal error: {context}")]
    Internal { context: String },

    /// No worker id could be leased within the retry budget.
    #[error("worker lease unavailable after {attempts} attempt(s): {context}")]
    LeaseUnavailable { attempts: u32, context: String },
}

/// Coarse classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Recoverable by correcting the input; never retried internally.
    Params,
    /// Propagated to the caller as-is; retry policy belongs to the caller.
    Internal,
    /// The generator cannot establish an identity and must not issue IDs.
    Fatal,
}

impl ErrorKind {
    /// Stable code exposed to API clients.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Params => "INVALID_PARAMETER",
            Self::Internal => "INTERNAL_SERVER_ERROR",
            Self::Fatal => "WORKER_LEASE_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Error {
    pub(crate) fn params(reason: impl Into<String>) -> Self {
        Self::Params {
            reason: reason.into(),
        }
    }

    pub(crate) fn internal(context: impl Into<String>) -> Self {
        Self::Internal {
            context: context.into(),
        }
    }

    pub(crate) fn invalid_identifier(input: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            input: input.into(),
        }
    }

    /// Returns the [`ErrorKind`] this error belongs to.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIdentifier { .. } | Self::Params { .. } => ErrorKind::Params,
            Self::Internal { .. } => ErrorKind::Internal,
            Self::LeaseUnavailable { .. } => ErrorKind::Fatal,
        }
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "sled")))]
#[cfg(feature = "sled")]
impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        Self::internal(format!("sled: {err}"))
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "sled")))]
#[cfg(feature = "sled")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("record codec: {err}"))
    }
}
