//! # Ethereum Addresses
//!
//! [`EthAddress`] is a 20-byte account or contract address. Parsing accepts
//! all-lowercase or all-uppercase hex as-is and verifies the EIP-55 checksum
//! of mixed-case input. Display is always the checksum form so that the
//! address written to `contractAddress.txt` and the address embedded in a
//! condition set are spelled the same way.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A 20-byte Ethereum address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EthAddress(Address);

impl EthAddress {
    /// The all-zero address.
    pub const ZERO: EthAddress = EthAddress(Address::ZERO);

    /// Wrap raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(Address::new(bytes))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0 .0 .0
    }

    /// EIP-55 checksummed string, `0x`-prefixed.
    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }
}

impl From<Address> for EthAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl From<EthAddress> for Address {
    fn from(address: EthAddress) -> Self {
        address.0
    }
}

impl FromStr for EthAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("0x")
            .ok_or_else(|| ValidationError::InvalidAddress(trimmed.to_string()))?;
        if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidAddress(trimmed.to_string()));
        }
        let mixed_case = body.chars().any(|c| c.is_ascii_lowercase())
            && body.chars().any(|c| c.is_ascii_uppercase());
        let address = if mixed_case {
            Address::parse_checksummed(trimmed, None)
                .map_err(|_| ValidationError::AddressChecksum(trimmed.to_string()))?
        } else {
            trimmed
                .parse::<Address>()
                .map_err(|_| ValidationError::InvalidAddress(trimmed.to_string()))?
        };
        Ok(Self(address))
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthAddress({})", self.to_checksum())
    }
}

impl Serialize for EthAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for EthAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
