//! Globally-unique identifiers.
//!
//! Laid out the way the automation runtime lays them out (`u32`, `u16`,
//! `u16`, `[u8; 8]`) so that well-known identifiers can be written as
//! constants in their canonical registry form.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

/// A 128-bit globally-unique identifier.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

/// Error returned when parsing a malformed guid string.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("malformed guid `{0}`")]
pub struct GuidParseError(pub String);

impl Guid {
    /// The all-zero guid.
    pub const NIL: Guid = Guid::from_fields(0, 0, 0, [0; 8]);

    /// Namespace used when deriving guids for entities that declare none.
    pub const EXPORT_NAMESPACE: Guid = Guid::from_fields(
        0x9C1A_6E3D,
        0x51B2,
        0x4F0E,
        [0x8A, 0x3B, 0x27, 0xD4, 0x61, 0x0C, 0x5E, 0x92],
    );

    /// Build a guid from its four registry-form fields.
    pub const fn from_fields(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Guid {
            data1,
            data2,
            data3,
            data4,
        }
    }

    /// Check if this is the nil guid.
    pub fn is_nil(&self) -> bool {
        *self == Guid::NIL
    }

    /// Big-endian byte form, the order used for hashing.
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..4].copy_from_slice(&self.data1.to_be_bytes());
        out[4..6].copy_from_slice(&self.data2.to_be_bytes());
        out[6..8].copy_from_slice(&self.data3.to_be_bytes());
        out[8..].copy_from_slice(&self.data4);
        out
    }

    fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&bytes[8..]);
        Guid {
            data1: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data2: u16::from_be_bytes([bytes[4], bytes[5]]),
            data3: u16::from_be_bytes([bytes[6], bytes[7]]),
            data4,
        }
    }

    /// Derive a stable name-based guid.
    ///
    /// Hashes `namespace` and `name` with SHA-256, keeps the first 16 bytes
    /// and stamps the RFC 4122 version (5) and variant bits. The same
    /// inputs always yield the same guid, so re-exporting an unchanged unit
    /// reproduces every derived identity.
    pub fn derive(namespace: &Guid, name: &str) -> Guid {
        let mut hasher = Sha256::new();
        hasher.update(namespace.to_bytes());
        hasher.update(name.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        bytes[6] = (bytes[6] & 0x0F) | 0x50;
        bytes[8] = (bytes[8] & 0x3F) | 0x80;
        Guid::from_bytes(bytes)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{self}}}")
    }
}

impl FromStr for Guid {
    type Err = GuidParseError;

    /// Parse `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`, optionally in braces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || GuidParseError(s.to_owned());
        let trimmed = s
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(s);

        let groups: Vec<&str> = trimmed.split('-').collect();
        let lens = [8, 4, 4, 4, 12];
        if groups.len() != lens.len()
            || groups.iter().zip(lens).any(|(g, len)| g.len() != len)
        {
            return Err(err());
        }

        let hex: String = groups.concat();
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = hex.get(i * 2..i * 2 + 2).ok_or_else(err)?;
            *byte = u8::from_str_radix(pair, 16).map_err(|_| err())?;
        }
        Ok(Guid::from_bytes(bytes))
    }
}
