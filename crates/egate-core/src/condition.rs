//! # Access-Control Conditions
//!
//! A [`ConditionSet`] is the declarative predicate the key-management network
//! evaluates before it will hand back a symmetric key. Field names and JSON
//! layout follow the network's wire format exactly:
//!
//! ```json
//! [{
//!   "contractAddress": "0x…",
//!   "standardContractType": "",
//!   "chain": "ethereum",
//!   "method": "isFundsReleased",
//!   "parameters": [],
//!   "returnValueTest": { "comparator": "=", "value": "true" }
//! }]
//! ```
//!
//! The set must be byte-identical (after canonicalization) between encrypt
//! and decrypt, so `contract_address` is kept as the exact string that was
//! written rather than re-normalized on read.

use serde::{Deserialize, Serialize};

use crate::address::EthAddress;
use crate::amount::Wei;
use crate::canonical::CanonicalBytes;
use crate::error::{CanonicalizationError, ValidationError};

/// Escrow getter that gates decryption.
pub const RELEASE_FLAG_METHOD: &str = "isFundsReleased";

/// Method name the network recognizes as a native-balance lookup.
pub const BALANCE_METHOD: &str = "eth_getBalance";

/// Placeholder the network substitutes with the requester's address.
pub const USER_ADDRESS_PARAM: &str = ":userAddress";

/// Comparison operator in a [`ReturnValueTest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// Equal.
    #[serde(rename = "=")]
    Eq,
    /// Greater than.
    #[serde(rename = ">")]
    Gt,
    /// Greater than or equal.
    #[serde(rename = ">=")]
    Gte,
    /// Less than.
    #[serde(rename = "<")]
    Lt,
    /// Less than or equal.
    #[serde(rename = "<=")]
    Lte,
    /// Substring / membership.
    #[serde(rename = "contains")]
    Contains,
}

/// Expected value of the called method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReturnValueTest {
    /// How to compare.
    pub comparator: Comparator,
    /// Right-hand side, always a string on the wire.
    pub value: String,
}

/// One EVM-basic access-control condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlCondition {
    /// Contract to call; empty for native-balance checks.
    pub contract_address: String,
    /// Standard interface hint (`""`, `"ERC20"`, ...). Empty for custom contracts.
    pub standard_contract_type: String,
    /// Chain name understood by the network.
    pub chain: String,
    /// Method to call.
    pub method: String,
    /// Call parameters.
    pub parameters: Vec<String>,
    /// Expected result.
    pub return_value_test: ReturnValueTest,
}

impl AccessControlCondition {
    /// `contract.isFundsReleased() == true` on `chain`.
    pub fn funds_released(contract: &EthAddress, chain: &str) -> Self {
        Self {
            contract_address: contract.to_checksum(),
            standard_contract_type: String::new(),
            chain: chain.to_string(),
            method: RELEASE_FLAG_METHOD.to_string(),
            parameters: Vec::new(),
            return_value_test: ReturnValueTest {
                comparator: Comparator::Eq,
                value: "true".to_string(),
            },
        }
    }

    /// Requester's native balance is at least `min` on `chain`.
    pub fn wallet_balance_at_least(min: Wei, chain: &str) -> Self {
        Self {
            contract_address: String::new(),
            standard_contract_type: String::new(),
            chain: chain.to_string(),
            method: BALANCE_METHOD.to_string(),
            parameters: vec![USER_ADDRESS_PARAM.to_string(), "latest".to_string()],
            return_value_test: ReturnValueTest {
                comparator: Comparator::Gte,
                value: min.0.to_string(),
            },
        }
    }

    fn validate(&self, index: usize) -> Result<(), ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidCondition { index, reason };
        if self.chain.trim().is_empty() {
            return Err(invalid("chain is empty".into()));
        }
        if self.method.trim().is_empty() {
            return Err(invalid("method is empty".into()));
        }
        if self.method == BALANCE_METHOD {
            if !self.contract_address.is_empty() {
                return Err(invalid("balance condition must not name a contract".into()));
            }
        } else {
            self.contract_address
                .parse::<EthAddress>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        Ok(())
    }
}

/// Ordered, non-empty list of conditions. Serializes as a bare JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionSet(Vec<AccessControlCondition>);

impl ConditionSet {
    /// Build and validate a set.
    pub fn new(conditions: Vec<AccessControlCondition>) -> Result<Self, ValidationError> {
        let set = Self(conditions);
        set.validate()?;
        Ok(set)
    }

    /// The escrow gate: a single `isFundsReleased() == true` condition.
    pub fn escrow_release(contract: &EthAddress, chain: &str) -> Self {
        Self(vec![AccessControlCondition::funds_released(contract, chain)])
    }

    /// Parse from JSON text and validate.
    pub fn from_json(text: &str) -> Result<Self, ValidationError> {
        let conditions: Vec<AccessControlCondition> = serde_json::from_str(text)
            .map_err(|e| ValidationError::InvalidCondition {
                index: 0,
                reason: format!("not a condition array: {e}"),
            })?;
        Self::new(conditions)
    }

    /// Pretty JSON, the layout pinned and cached on disk.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }

    /// Check structural validity of every condition.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::EmptyConditionSet);
        }
        for (i, c) in self.0.iter().enumerate() {
            c.validate(i)?;
        }
        Ok(())
    }

    /// Canonical bytes for equality checks.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(&self.0)
    }

    /// True when both sets canonicalize to the same bytes.
    pub fn matches(&self, other: &ConditionSet) -> Result<bool, CanonicalizationError> {
        Ok(self.canonical_bytes()? == other.canonical_bytes()?)
    }

    /// Borrow the conditions.
    pub fn conditions(&self) -> &[AccessControlCondition] {
        &self.0
    }

    /// Chain of the first condition.
    pub fn chain(&self) -> Option<&str> {
        self.0.first().map(|c| c.chain.as_str())
    }
}
