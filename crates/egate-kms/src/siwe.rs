//! # Sign-In With Ethereum (EIP-4361)
//!
//! The signer proves control of an address by `personal_sign`-ing a
//! plain-text message. The node's latest block hash is the nonce, so a
//! message cannot be replayed against a later handshake.

use chrono::{DateTime, SecondsFormat, Utc};
use egate_core::EthAddress;
use egate_crypto::{recover_personal, Wallet};
use serde::{Deserialize, Serialize};

use crate::error::KmsError;

/// `derivedVia` for wallet-signed AuthSigs.
pub const WALLET_DERIVED_VIA: &str = "web3.eth.personal.sign";

/// An EIP-4361 message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiweMessage {
    pub domain: String,
    pub address: EthAddress,
    pub statement: String,
    pub uri: String,
    pub chain_id: u64,
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
    pub resources: Vec<String>,
}

impl SiweMessage {
    /// The exact text that is signed.
    pub fn to_message(&self) -> String {
        let mut msg = format!(
            "{domain} wants you to sign in with your Ethereum account:\n\
             {address}\n\
             \n\
             {statement}\n\
             \n\
             URI: {uri}\n\
             Version: 1\n\
             Chain ID: {chain_id}\n\
             Nonce: {nonce}\n\
             Issued At: {issued_at}\n\
             Expiration Time: {expiration}",
            domain = self.domain,
            address = self.address.to_checksum(),
            statement = self.statement,
            uri = self.uri,
            chain_id = self.chain_id,
            nonce = self.nonce,
            issued_at = timestamp(&self.issued_at),
            expiration = timestamp(&self.expiration_time),
        );
        if !self.resources.is_empty() {
            msg.push_str("\nResources:");
            for r in &self.resources {
                msg.push_str("\n- ");
                msg.push_str(r);
            }
        }
        msg
    }

    /// Sign with `wallet` (EIP-191) and package as an [`AuthSig`].
    pub fn sign(&self, wallet: &Wallet) -> Result<AuthSig, KmsError> {
        let signed_message = self.to_message();
        Ok(AuthSig {
            sig: wallet.personal_sign(signed_message.as_bytes())?,
            derived_via: WALLET_DERIVED_VIA.to_string(),
            signed_message,
            address: wallet.address().to_checksum(),
        })
    }
}

/// Proof that `address` signed `signed_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSig {
    pub sig: String,
    pub derived_via: String,
    pub signed_message: String,
    pub address: String,
}

impl AuthSig {
    /// Recover the signer and compare it to `address`.
    pub fn verify(&self) -> Result<(), KmsError> {
        let claimed: EthAddress = self.address.parse()?;
        let recovered = recover_personal(self.signed_message.as_bytes(), &self.sig)?;
        if recovered != claimed {
            return Err(KmsError::InvalidResponse {
                endpoint: "authSig".into(),
                reason: format!("signature recovers to {recovered}, not {claimed}"),
            });
        }
        Ok(())
    }
}

/// EIP-155 chain id for a condition-set chain name.
///
/// Unknown names map to mainnet; the id only scopes the sign-in message.
pub fn chain_id_for(chain: &str) -> u64 {
    match chain {
        "sepolia" => 11_155_111,
        "goerli" => 5,
        "polygon" => 137,
        "amoy" => 80_002,
        "base" => 8_453,
        "arbitrum" => 42_161,
        "optimism" => 10,
        _ => 1,
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
pub fn timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}
