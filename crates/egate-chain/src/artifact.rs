//! # Compiled Contract Artifacts
//!
//! Reads the JSON a Solidity toolchain emits for one contract. Two layouts are
//! accepted:
//!
//! - Foundry: `{"abi": [...], "bytecode": {"object": "0x..."}}`
//! - Hardhat: `{"abi": [...], "bytecode": "0x..."}`
//!
//! The ABI is used only to confirm that the functions a stage is about to call
//! exist, so a wrong artifact fails before any network request.

use std::path::Path;

use serde::Deserialize;

use crate::error::ChainError;

/// Default Foundry output path relative to the working directory.
pub const DEFAULT_ARTIFACT_PATH: &str = "../out/Escrow.sol/Escrow.json";

/// One ABI entry. Only the fields used for lookups are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub state_mutability: Option<String>,
}

/// A function or constructor parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Foundry { object: String },
    Hardhat(String),
}

#[derive(Deserialize)]
struct RawArtifact {
    abi: Vec<AbiEntry>,
    bytecode: RawBytecode,
}

/// A loaded contract artifact.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub abi: Vec<AbiEntry>,
    /// Creation bytecode.
    pub bytecode: Vec<u8>,
}

impl ContractArtifact {
    /// Read and parse an artifact file.
    pub fn load(path: &Path) -> Result<Self, ChainError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ChainError::Artifact(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
            .map_err(|e| ChainError::Artifact(format!("{}: {e}", path.display())))
    }

    /// Parse artifact JSON.
    pub fn from_json(text: &str) -> Result<Self, String> {
        let raw: RawArtifact =
            serde_json::from_str(text).map_err(|e| format!("malformed artifact JSON: {e}"))?;
        let hex_text = match raw.bytecode {
            RawBytecode::Foundry { object } => object,
            RawBytecode::Hardhat(s) => s,
        };
        let bytecode = egate_core::decode_hex_prefixed(&hex_text, "bytecode")
            .map_err(|e| e.to_string())?;
        Ok(Self {
            abi: raw.abi,
            bytecode,
        })
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Option<&AbiEntry> {
        self.abi
            .iter()
            .find(|e| e.kind == "function" && e.name.as_deref() == Some(name))
    }

    /// Constructor parameter types, empty when the ABI declares none.
    pub fn constructor_inputs(&self) -> Vec<&str> {
        self.abi
            .iter()
            .find(|e| e.kind == "constructor")
            .map(|e| e.inputs.iter().map(|p| p.kind.as_str()).collect())
            .unwrap_or_default()
    }

    /// Fail unless every named function is declared.
    pub fn require_functions(&self, names: &[&str]) -> Result<(), ChainError> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| self.function(n).is_none())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ChainError::Artifact(format!(
                "ABI does not declare: {}",
                missing.join(", ")
            )))
        }
    }

    /// Fail unless bytecode is present and the constructor takes one address.
    pub fn require_deployable(&self) -> Result<(), ChainError> {
        if self.bytecode.is_empty() {
            return Err(ChainError::Artifact(
                "artifact has empty bytecode (abstract contract or interface?)".into(),
            ));
        }
        let inputs = self.constructor_inputs();
        if inputs != ["address"] {
            return Err(ChainError::Artifact(format!(
                "expected constructor(address seller), found constructor({})",
                inputs.join(",")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESCROW_ABI: &str = r#"[
        {"type":"constructor","inputs":[{"name":"_seller","type":"address"}],"stateMutability":"nonpayable"},
        {"type":"function","name":"deposit","inputs":[],"outputs":[],"stateMutability":"payable"},
        {"type":"function","name":"releaseFunds","inputs":[],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"function","name":"isFundsDeposited","inputs":[],"outputs":[{"name":"","type":"bool"}],"stateMutability":"view"},
        {"type":"function","name":"isFundsReleased","inputs":[],"outputs":[{"name":"","type":"bool"}],"stateMutability":"view"}
    ]"#;

    #[test]
    fn loads_foundry_layout() {
        let json = format!(r#"{{"abi":{ESCROW_ABI},"bytecode":{{"object":"0x6080","sourceMap":""}}}}"#);
        let artifact = ContractArtifact::from_json(&json).unwrap();
        assert_eq!(artifact.bytecode, vec![0x60, 0x80]);
        assert!(artifact.function("deposit").is_some());
        assert_eq!(artifact.constructor_inputs(), vec!["address"]);
        artifact.require_deployable().unwrap();
    }

    #[test]
    fn loads_hardhat_layout() {
        let json = format!(r#"{{"abi":{ESCROW_ABI},"bytecode":"0x6080"}}"#);
        let artifact = ContractArtifact::from_json(&json).unwrap();
        assert_eq!(artifact.bytecode.len(), 2);
    }

    #[test]
    fn missing_function_is_reported() {
        let json = r#"{"abi":[{"type":"function","name":"deposit","inputs":[]}],"bytecode":"0x00"}"#;
        let artifact = ContractArtifact::from_json(json).unwrap();
        let err = artifact
            .require_functions(&["deposit", "isFundsDeposited"])
            .unwrap_err();
        assert!(err.to_string().contains("isFundsDeposited"));
    }

    #[test]
    fn wrong_constructor_is_not_deployable() {
        let json = r#"{"abi":[{"type":"constructor","inputs":[]}],"bytecode":"0x00"}"#;
        let artifact = ContractArtifact::from_json(json).unwrap();
        assert!(artifact.require_deployable().is_err());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(ContractArtifact::from_json("{").is_err());
        assert!(ContractArtifact::from_json(r#"{"abi":[],"bytecode":"0xzz"}"#).is_err());
    }

    #[test]
    fn missing_file_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContractArtifact::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ChainError::Artifact(_)));
    }
}
