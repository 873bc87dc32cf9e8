//! Error kinds and errors produced by transports and policy construction.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Classification attached to every failure a transport reports.
///
/// Built-in kinds form a small hierarchy (see [`ErrorKind::parent`]) so a
/// retry set containing `Timeout` also matches `ConnectTimeout`. Callers can
/// tag their own failures with [`ErrorKind::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Root of all built-in transport failures.
    Transport,
    Timeout,
    ConnectTimeout,
    ReadTimeout,
    WriteTimeout,
    PoolTimeout,
    /// Network-level failure (connection reset, DNS, etc.).
    Network,
    Connect,
    Read,
    Write,
    Protocol,
    LocalProtocol,
    RemoteProtocol,
    /// The operation was aborted before completing.
    Cancelled,
    /// The transport was closed.
    Closed,
    /// Caller-supplied classification. Has no parent.
    Custom(Cow<'static, str>),
}

impl ErrorKind {
    /// Creates a caller-defined kind.
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        ErrorKind::Custom(name.into())
    }

    /// Direct parent in the kind hierarchy, if any.
    pub fn parent(&self) -> Option<ErrorKind> {
        use ErrorKind::*;
        match self {
            Transport | Custom(_) => None,
            Timeout | Network | Protocol | Cancelled | Closed => Some(Transport),
            ConnectTimeout | ReadTimeout | WriteTimeout | PoolTimeout => Some(Timeout),
            Connect | Read | Write => Some(Network),
            LocalProtocol | RemoteProtocol => Some(Protocol),
        }
    }

    /// True if `self` is `other` or one of its descendants.
    pub fn is_a(&self, other: &ErrorKind) -> bool {
        let mut current = Some(self.clone());
        while let Some(kind) = current {
            if &kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    pub fn as_str(&self) -> &str {
        use ErrorKind::*;
        match self {
            Transport => "transport",
            Timeout => "timeout",
            ConnectTimeout => "connect-timeout",
            ReadTimeout => "read-timeout",
            WriteTimeout => "write-timeout",
            PoolTimeout => "pool-timeout",
            Network => "network",
            Connect => "connect",
            Read => "read",
            Write => "write",
            Protocol => "protocol",
            LocalProtocol => "local-protocol",
            RemoteProtocol => "remote-protocol",
            Cancelled => "cancelled",
            Closed => "closed",
            Custom(name) => name,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = std::convert::Infallible;

    /// Parses kebab-case names; anything unrecognised becomes `Custom`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ErrorKind::*;
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Ok(match normalized.as_str() {
            "transport" => Transport,
            "timeout" => Timeout,
            "connect-timeout" => ConnectTimeout,
            "read-timeout" => ReadTimeout,
            "write-timeout" => WriteTimeout,
            "pool-timeout" => PoolTimeout,
            "network" | "connection" => Network,
            "connect" => Connect,
            "read" => Read,
            "write" => Write,
            "protocol" => Protocol,
            "local-protocol" => LocalProtocol,
            "remote-protocol" => RemoteProtocol,
            "cancelled" => Cancelled,
            "closed" => Closed,
            _ => Custom(Cow::Owned(s.trim().to_string())),
        })
    }
}

/// Failure reported by a transport for a single attempt (or by the retrying
/// transport itself when closed).
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl TransportError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn closed() -> Self {
        Self::new(ErrorKind::Closed, "transport is closed")
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Invalid retry policy parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    #[error("backoff_factor must be a non-negative number, got {0}")]
    BackoffFactor(f64),
    #[error("max_backoff_wait must be a non-negative number, got {0}")]
    MaxBackoffWait(f64),
    #[error("jitter must be between 0 and 1, got {0}")]
    Jitter(f64),
}
