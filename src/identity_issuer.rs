//! Self-Signed Identity Issuance Module
//!
//! Generates a fresh RSA key pair and a self-signed TLS server certificate, then
//! writes both to disk as PEM so the HTTPS server can load them at startup.
//!
//! # Artifacts
//! - **Private key**: PKCS#1 DER in a `RSA PRIVATE KEY` PEM block
//! - **Certificate**: X.509v3 DER in a `CERTIFICATE` PEM block
//!
//! # Certificate Properties
//! - **Self-signed**: Issuer and subject are the same (`O=TLS Inspect Labs`)
//! - **Serial Number**: Fixed at 1 (one certificate per process)
//! - **Validity**: Generation instant to generation instant + 365 days
//! - **Key Usage**: digitalSignature, keyEncipherment
//! - **Extended Key Usage**: serverAuth
//! - **Basic Constraints**: CA=false
//!
//! # Example
//! ```rust,no_run
//! # fn example() -> tls_inspect::error::Result<()> {
//! tls_inspect::identity_issuer::issue("private.pem", "cert.pem")?;
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::{BasicConstraints, ExtendedKeyUsage, KeyUsage};
use openssl::x509::{X509Name, X509};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{IssueError, Result};

const X509_VERSION_3: i32 = 2; // X509 version 3 is represented by 2
pub const RSA_KEY_SIZE: u32 = 2048;
pub const CERTIFICATE_SERIAL: u32 = 1;
pub const ORGANIZATION: &str = "TLS Inspect Labs";
pub const VALIDITY_DAYS: u32 = 365;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const PRIVATE_KEY_MODE: u32 = 0o600;
const CERTIFICATE_MODE: u32 = 0o644;

/// Generate the key pair and self-signed certificate and write them to
/// `key_path` and `cert_path`.
///
/// The key file is written before the certificate is built. If writing the key
/// fails, no certificate is attempted. Each file is replaced atomically, so a
/// failed write never leaves a truncated artifact behind.
pub fn issue(key_path: impl AsRef<Path>, cert_path: impl AsRef<Path>) -> Result<()> {
    let key_path = key_path.as_ref();
    let cert_path = cert_path.as_ref();

    let private_key = generate_key_pair(RSA_KEY_SIZE)?;
    let key_pem = private_key_to_pem(&private_key)?;
    write_artifact(key_path, &key_pem, PRIVATE_KEY_MODE)?;
    info!(path = %key_path.display(), bits = RSA_KEY_SIZE, "Private key written");

    let certificate = self_signed_certificate(&private_key)?;
    let cert_pem = certificate
        .to_pem()
        .map_err(IssueError::CertificateSigning)?;
    write_artifact(cert_path, &cert_pem, CERTIFICATE_MODE)?;
    info!(path = %cert_path.display(), "Self-signed certificate written");

    Ok(())
}

/// Generate a fresh RSA key pair from OpenSSL's CSPRNG.
pub fn generate_key_pair(bits: u32) -> Result<PKey<Private>> {
    let rsa = Rsa::generate(bits).map_err(IssueError::KeyGeneration)?;
    PKey::from_rsa(rsa).map_err(IssueError::KeyGeneration)
}

/// Encode an RSA private key as a PKCS#1 `RSA PRIVATE KEY` PEM block.
pub fn private_key_to_pem(private_key: &PKey<Private>) -> Result<Vec<u8>> {
    private_key
        .rsa()
        .and_then(|rsa| rsa.private_key_to_pem())
        .map_err(IssueError::KeyGeneration)
}

/// Build and self-sign the TLS server certificate with `private_key`
///
/// The public key is derived from `private_key`, and the same key signs the
/// certificate (SHA-256 with RSA). Validity is anchored on a single captured
/// instant so `notAfter - notBefore` is exactly `VALIDITY_DAYS * 24h`.
///
/// # Errors
/// Returns [`IssueError::CertificateSigning`] if any template field,
/// extension, or the signature itself cannot be produced.
pub fn self_signed_certificate(private_key: &PKey<Private>) -> Result<X509> {
    build_certificate(private_key).map_err(IssueError::CertificateSigning)
}

fn build_certificate(
    private_key: &PKey<Private>,
) -> std::result::Result<X509, openssl::error::ErrorStack> {
    let mut builder = X509::builder()?;
    builder.set_version(X509_VERSION_3)?;

    let serial = BigNum::from_u32(CERTIFICATE_SERIAL)?.to_asn1_integer()?;
    builder.set_serial_number(&serial)?;

    let mut name_builder = X509Name::builder()?;
    name_builder.append_entry_by_nid(Nid::ORGANIZATIONNAME, ORGANIZATION)?;
    let name = name_builder.build();
    builder.set_subject_name(&name)?;
    builder.set_issuer_name(&name)?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    let not_before = Asn1Time::from_unix(now as _)?;
    let not_after =
        Asn1Time::from_unix((now + i64::from(VALIDITY_DAYS) * SECONDS_PER_DAY) as _)?;
    builder.set_not_before(&not_before)?;
    builder.set_not_after(&not_after)?;

    builder.set_pubkey(private_key)?;

    // CA=false, end-entity certificate
    let bc = BasicConstraints::new().critical().build()?;
    builder.append_extension(bc)?;

    let ku = KeyUsage::new()
        .critical()
        .digital_signature()
        .key_encipherment()
        .build()?;
    builder.append_extension(ku)?;

    let eku = ExtendedKeyUsage::new().server_auth().build()?;
    builder.append_extension(eku)?;

    builder.sign(private_key, MessageDigest::sha256())?;
    Ok(builder.build())
}

fn write_artifact(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    let write_err = |source: std::io::Error| IssueError::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(contents).map_err(write_err)?;
    file.as_file().sync_all().map_err(write_err)?;
    set_mode(file.as_file(), mode).map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(file: &std::fs::File, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &std::fs::File, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
