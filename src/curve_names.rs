//! Key exchange group display names
//!
//! A closed table mapping TLS `NamedGroup` code points to the names shown in
//! the connection report. Codes outside the table are an error, never a guess.

use crate::error::InspectError;

pub const SECP256R1: u16 = 0x0017;
pub const SECP384R1: u16 = 0x0018;
pub const SECP521R1: u16 = 0x0019;
pub const X25519: u16 = 0x001d;
pub const X25519_KYBER768_DRAFT00: u16 = 0x6399;
pub const X25519_MLKEM768: u16 = 0x11ec;

const CURVE_NAMES: &[(u16, &str)] = &[
    (SECP256R1, "P256"),
    (SECP384R1, "P384"),
    (SECP521R1, "P521"),
    (X25519, "X25519"),
    (X25519_KYBER768_DRAFT00, "X25519Kyber768Draft00"),
    (X25519_MLKEM768, "X25519MLKEM768"),
];

/// Resolve a key exchange group code point to its display name.
pub fn curve_name(group: u16) -> Result<&'static str, InspectError> {
    CURVE_NAMES
        .iter()
        .find(|(code, _)| *code == group)
        .map(|(_, name)| *name)
        .ok_or(InspectError::UnknownGroup(group))
}
