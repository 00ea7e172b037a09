use std::fmt::{Display, Formatter};
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// A tracer error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A tracer error.
///
/// Timeouts and malformed replies are not errors, see [`crate::ProbeResult`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid config: {0}")]
    BadConfig(String),
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("Probe failed to send: {0}")]
    ProbeFailed(IoError),
    #[error("privilege error: {0}")]
    PrivilegeError(#[from] hoptrace_privilege::Error),
}

/// Custom IO error result.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Custom IO error.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Bind error for {1}: {0}")]
    Bind(io::Error, SocketAddr),
    #[error("Sendto error for {1}: {0}")]
    SendTo(io::Error, SocketAddr),
    #[error("Failed to {1}: {0}")]
    Other(io::Error, IoOperation),
}

impl IoError {
    /// The kind of the underlying [`io::Error`].
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::Bind(e, _) | Self::SendTo(e, _) | Self::Other(e, _) => e.kind(),
        }
    }
}

/// Io operation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IoOperation {
    NewSocket,
    SetNonBlocking,
    SetTtl,
    Select,
    RecvFrom,
}

impl Display for IoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewSocket => write!(f, "create new socket"),
            Self::SetNonBlocking => write!(f, "set non-blocking"),
            Self::SetTtl => write!(f, "set TTL"),
            Self::Select => write!(f, "select"),
            Self::RecvFrom => write!(f, "recv from"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_io_error_kind() {
        let err = IoError::Other(
            io::Error::from(io::ErrorKind::PermissionDenied),
            IoOperation::NewSocket,
        );
        assert_eq!(io::ErrorKind::PermissionDenied, err.kind());
    }

    #[test]
    fn test_io_error_display() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 0);
        let err = IoError::SendTo(io::Error::from(io::ErrorKind::Other), addr);
        assert!(err.to_string().starts_with("Sendto error for 10.0.0.1:0"));
        let err = IoError::Other(io::Error::from(io::ErrorKind::Other), IoOperation::SetTtl);
        assert!(err.to_string().starts_with("Failed to set TTL"));
    }
}
