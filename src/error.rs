//! Error types for tls-inspect
//!
//! Issuance errors are fatal to startup and bubble up to `main`. Inspection
//! errors are per-request and end up as a diagnostic line in the response.

use std::path::PathBuf;

use openssl::error::ErrorStack;
use thiserror::Error;

/// Errors raised while issuing the self-signed identity
#[derive(Error, Debug)]
pub enum IssueError {
    #[error("Failed to generate private key: {0}")]
    KeyGeneration(#[source] ErrorStack),

    #[error("Failed to write {}: {source}", .path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create certificate: {0}")]
    CertificateSigning(#[source] ErrorStack),
}

/// Errors raised while describing a connection's negotiated parameters
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectError {
    #[error("the request is not a TLS connection")]
    NotSecure,

    #[error("the negotiated key exchange group is not exposed by this session")]
    GroupUnavailable,

    #[error("unknown curve ID: {0:#06x}")]
    UnknownGroup(u16),
}

/// Result type alias for issuance
pub type Result<T> = std::result::Result<T, IssueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_group_display() {
        let err = InspectError::UnknownGroup(0x9999);
        assert_eq!(err.to_string(), "unknown curve ID: 0x9999");

        let err = InspectError::UnknownGroup(0x1d);
        assert_eq!(err.to_string(), "unknown curve ID: 0x001d");
    }

    #[test]
    fn test_artifact_write_display() {
        let err = IssueError::ArtifactWrite {
            path: PathBuf::from("/nonexistent/private.pem"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "test"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/private.pem"));
        assert!(msg.contains("test"));
    }
}
