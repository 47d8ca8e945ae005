//! # Wei Amounts
//!
//! Ether values are carried as integer wei. A `u128` covers roughly 3.4e20
//! ether, far above any escrow deposit. Decimal ether strings are parsed
//! exactly; there is no float on the path from configuration to transaction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;
const ETHER_DECIMALS: usize = 18;

/// An amount in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wei(pub u128);

impl Wei {
    /// Zero wei.
    pub const ZERO: Wei = Wei(0);

    /// Parse a decimal ether string such as `"0.001"` or `"2"`.
    pub fn parse_ether(s: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidAmount {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty"));
        }
        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("no digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("only decimal digits and one '.' are allowed"));
        }
        if frac.len() > ETHER_DECIMALS {
            return Err(invalid("more than 18 decimal places"));
        }

        let whole_wei = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u128>()
                .ok()
                .and_then(|w| w.checked_mul(WEI_PER_ETHER))
                .ok_or_else(|| invalid("overflow"))?
        };
        let frac_wei = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<18}");
            padded.parse::<u128>().map_err(|_| invalid("overflow"))?
        };

        whole_wei
            .checked_add(frac_wei)
            .map(Wei)
            .ok_or_else(|| invalid("overflow"))
    }

    /// Decimal ether string with trailing zeros removed.
    pub fn format_ether(&self) -> String {
        let whole = self.0 / WEI_PER_ETHER;
        let frac = self.0 % WEI_PER_ETHER;
        if frac == 0 {
            return whole.to_string();
        }
        let frac_str = format!("{frac:018}");
        format!("{whole}.{}", frac_str.trim_end_matches('0'))
    }

    /// JSON-RPC quantity encoding (`0x` + minimal hex).
    pub fn to_quantity(&self) -> String {
        format!("0x{:x}", self.0)
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH", self.format_ether())
    }
}
