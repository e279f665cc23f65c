use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::BallotvestError;

/// Token amount in base units. Unsigned; all arithmetic truncates.
pub type Balance = u128;

/// Unix timestamp (seconds, UTC), supplied by the caller of each step.
pub type Timestamp = i64;

/// Sequential election identifier, allocated from 0.
pub type ElectionId = u64;

// ── Address ──────────────────────────────────────────────────────────────────

/// 32-byte account identifier.
///
/// Human-readable encodings (JSON, CLI output) use base-58. Binary encodings
/// (bincode in the state store) use the raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The null address. Never a valid beneficiary.
    pub const ZERO: Address = Address([0u8; 32]);

    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Deterministic address for a label: BLAKE3(label).
    pub fn derive(label: &str) -> Self {
        Self(*blake3::hash(label.as_bytes()).as_bytes())
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, BallotvestError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| BallotvestError::InvalidAddress(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }

    /// Base-58 encoded string representation.
    pub fn to_b58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    pub fn from_b58(s: &str) -> Result<Self, BallotvestError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| BallotvestError::InvalidAddress(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, BallotvestError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| BallotvestError::InvalidAddress(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl FromStr for Address {
    type Err = BallotvestError;

    /// Accepts `0x`-prefixed hex or base-58.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") {
            Self::from_hex(s)
        } else {
            Self::from_b58(s)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_b58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b58 = self.to_b58();
        write!(f, "Address({})", &b58[..b58.len().min(8)])
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_b58())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(D::Error::custom)
        } else {
            <[u8; 32]>::deserialize(deserializer).map(Address)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_address_is_default() {
        assert!(Address::ZERO.is_zero());
        assert_eq!(Address::default(), Address::ZERO);
        assert!(!Address::derive("alice").is_zero());
    }

    #[test]
    fn derive_is_deterministic() {
        assert_eq!(Address::derive("alice"), Address::derive("alice"));
        assert_ne!(Address::derive("alice"), Address::derive("bob"));
    }

    #[test]
    fn parses_hex_and_b58() {
        let a = Address::derive("carol");
        assert_eq!(a.to_b58().parse::<Address>().unwrap(), a);
        assert_eq!(a.to_hex().parse::<Address>().unwrap(), a);
    }

    #[test]
    fn short_input_rejected() {
        let err = Address::from_hex("0xdeadbeef").unwrap_err();
        assert!(matches!(err, BallotvestError::InvalidAddress(_)));
    }

    #[test]
    fn json_uses_base58_string() {
        let a = Address::derive("dave");
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", a.to_b58()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
