//! TLS Inspect - Self-Signed Identity and Session Introspection
//!
//! Issues a throwaway self-signed TLS identity at startup and serves an HTTPS
//! endpoint that reports, for every connection, the key exchange group and
//! cipher suite the handshake negotiated.
//!
//! # Overview
//!
//! ```text
//! startup:     identity_issuer::issue ──► private.pem + cert.pem
//!                                              │
//!                                              ▼
//! per conn:    TLS handshake ──► NegotiatedParameters ──► introspection::describe ──► response body
//! ```
//!
//! # Module Overview
//!
//! ## [`identity_issuer`]
//!
//! Generates an RSA-2048 key pair and a self-signed X.509v3 server certificate
//! and writes them as PKCS#1 / X.509 PEM files.
//!
//! ```no_run
//! tls_inspect::identity_issuer::issue("private.pem", "cert.pem")?;
//! # Ok::<(), tls_inspect::error::IssueError>(())
//! ```
//!
//! ## [`introspection`]
//!
//! Maps a connection's negotiated parameters to display names.
//!
//! ```
//! use tls_inspect::introspection::{describe, NegotiatedParameters};
//!
//! let params = NegotiatedParameters {
//!     key_exchange_group: Some(0x001d),
//!     cipher_suite: 0x1301,
//! };
//! let report = describe(Some(&params)).unwrap();
//! assert!(report.to_string().contains("X25519"));
//! ```
//!
//! ## [`webserver`]
//!
//! axum router served by axum-server over rustls, with an acceptor that
//! captures each connection's negotiated parameters.
//!
//! # Error Handling
//!
//! Issuance returns [`error::IssueError`]; these are fatal at startup.
//! Introspection returns [`error::InspectError`]; these are rendered into the
//! response and never abort the connection.

pub mod configs;
pub mod curve_names;
pub mod error;
pub mod identity_issuer;
pub mod introspection;
pub mod webserver;

pub use error::{InspectError, IssueError};
pub use identity_issuer::issue;
pub use introspection::{describe, ConnectionReport, NegotiatedParameters};
