//! Connection introspection.
//!
//! After a TLS handshake completes, the acceptor captures a
//! [`NegotiatedParameters`] snapshot for the connection. [`describe`] turns that
//! snapshot into a human-readable [`ConnectionReport`].

use std::fmt;

use crate::curve_names::curve_name;
use crate::error::InspectError;

/// Snapshot of negotiated connection parameters after handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedParameters {
    /// Negotiated key exchange group, when the session exposes it.
    pub key_exchange_group: Option<u16>,
    /// Negotiated cipher suite.
    pub cipher_suite: u16,
}

impl NegotiatedParameters {
    /// Capture the negotiated parameters of a rustls server session.
    ///
    /// Returns `None` until the handshake has selected a cipher suite. The key
    /// exchange group is best-effort: rustls only reports it once key exchange
    /// has happened, and resumed TLS 1.2 sessions never report one.
    pub fn from_connection(conn: &rustls::ServerConnection) -> Option<Self> {
        let suite = conn.negotiated_cipher_suite()?;
        Some(Self {
            key_exchange_group: conn
                .negotiated_key_exchange_group()
                .map(|group| u16::from(group.name())),
            cipher_suite: u16::from(suite.suite()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyExchangeGroup {
    pub id: u16,
    pub name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherSuiteInfo {
    pub id: u16,
    pub name: String,
}

impl CipherSuiteInfo {
    /// Resolve the display name through rustls' cipher suite table. Codes rustls
    /// does not know render as `0xHHHH`.
    pub fn resolve(id: u16) -> Self {
        let name = rustls::CipherSuite::from(id)
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{id:#06x}"));
        Self { id, name }
    }
}

/// Diagnostic report for one secure connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionReport {
    pub group: Result<KeyExchangeGroup, InspectError>,
    pub cipher_suite: CipherSuiteInfo,
}

impl fmt::Display for ConnectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Ok(group) => writeln!(
                f,
                "TLS Connection: Curve ID: {:#06x}, Name: {}",
                group.id, group.name
            )?,
            Err(InspectError::UnknownGroup(id)) => {
                writeln!(f, "TLS Connection: Unknown curve ID: {id:#06x}")?
            }
            Err(e) => writeln!(f, "TLS Connection: Curve ID unavailable: {e}")?,
        }
        writeln!(
            f,
            "TLS Connection: Cipher Suite: {} ({:#06x}), Name: {}",
            self.cipher_suite.id, self.cipher_suite.id, self.cipher_suite.name
        )
    }
}

/// Describe the negotiated parameters of a connection.
///
/// `session` is `None` for plaintext connections, which fail with
/// [`InspectError::NotSecure`]. Group lookup failures do not fail the call;
/// they are carried in [`ConnectionReport::group`] and rendered as a diagnostic
/// line, with the cipher suite still reported.
pub fn describe(session: Option<&NegotiatedParameters>) -> Result<ConnectionReport, InspectError> {
    let params = session.ok_or(InspectError::NotSecure)?;
    Ok(ConnectionReport {
        group: resolve_group(params),
        cipher_suite: CipherSuiteInfo::resolve(params.cipher_suite),
    })
}

fn resolve_group(params: &NegotiatedParameters) -> Result<KeyExchangeGroup, InspectError> {
    let id = params
        .key_exchange_group
        .ok_or(InspectError::GroupUnavailable)?;
    let name = curve_name(id)?;
    Ok(KeyExchangeGroup { id, name })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TLS13_AES_128_GCM_SHA256: u16 = 0x1301;

    #[test]
    fn test_describe_x25519() {
        let params = NegotiatedParameters {
            key_exchange_group: Some(0x1d),
            cipher_suite: TLS13_AES_128_GCM_SHA256,
        };
        let report = describe(Some(&params)).unwrap();

        assert_eq!(
            report.group,
            Ok(KeyExchangeGroup {
                id: 0x1d,
                name: "X25519"
            })
        );
        assert_eq!(report.cipher_suite.name, "TLS13_AES_128_GCM_SHA256");

        let text = report.to_string();
        assert!(text.contains("Curve ID: 0x001d, Name: X25519"));
        assert!(text.contains("Cipher Suite: 4865 (0x1301), Name: TLS13_AES_128_GCM_SHA256"));
    }

    #[test]
    fn test_describe_unknown_group_keeps_cipher() {
        let params = NegotiatedParameters {
            key_exchange_group: Some(0x9999),
            cipher_suite: TLS13_AES_128_GCM_SHA256,
        };
        let report = describe(Some(&params)).unwrap();

        assert_eq!(report.group, Err(InspectError::UnknownGroup(0x9999)));
        let text = report.to_string();
        assert!(text.contains("Unknown curve ID: 0x9999"));
        assert!(text.contains("TLS13_AES_128_GCM_SHA256"));
    }

    #[test]
    fn test_describe_group_unavailable() {
        let params = NegotiatedParameters {
            key_exchange_group: None,
            cipher_suite: 0xc02f,
        };
        let report = describe(Some(&params)).unwrap();

        assert_eq!(report.group, Err(InspectError::GroupUnavailable));
        let text = report.to_string();
        assert!(text.contains("Curve ID unavailable"));
        assert!(text.contains("TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256"));
    }

    #[test]
    fn test_describe_not_secure() {
        assert_eq!(describe(None), Err(InspectError::NotSecure));
    }

    #[test]
    fn test_unlisted_cipher_suite_renders_hex() {
        let info = CipherSuiteInfo::resolve(0xfafa);
        assert_eq!(info.name, "0xfafa");
    }
}
