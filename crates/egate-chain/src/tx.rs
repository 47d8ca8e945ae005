//! # Legacy Transactions (EIP-155)
//!
//! The signing payload is
//! `rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0])`; the
//! broadcast form replaces the last three fields with
//! `v = parity + chainId * 2 + 35`, `r`, `s`. Contract creation encodes
//! `to` as the empty string. Encoding is alloy's [`TxLegacy`].

use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use egate_core::{keccak256, to_hex_prefixed, EthAddress, Wei};
use egate_crypto::{CryptoError, Wallet};

/// An unsigned pre-London transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// `None` deploys `data` as init code.
    pub to: Option<EthAddress>,
    pub value: Wei,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// RLP-encoded transaction.
    pub raw: Vec<u8>,
    /// `keccak256(raw)`.
    pub hash: [u8; 32],
}

impl SignedTransaction {
    /// `0x`-prefixed raw bytes.
    pub fn raw_hex(&self) -> String {
        to_hex_prefixed(&self.raw)
    }

    /// `0x`-prefixed transaction hash.
    pub fn hash_hex(&self) -> String {
        to_hex_prefixed(&self.hash)
    }
}

impl LegacyTransaction {
    fn to_alloy(&self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: match self.to {
                Some(addr) => TxKind::Call(Address::from(addr)),
                None => TxKind::Create,
            },
            value: U256::from(self.value.0),
            input: Bytes::from(self.data.clone()),
        }
    }

    /// RLP payload hashed for signing.
    pub fn signing_payload(&self) -> Vec<u8> {
        self.to_alloy().encoded_for_signing()
    }

    /// `keccak256(signing_payload)`.
    pub fn signing_hash(&self) -> [u8; 32] {
        self.to_alloy().signature_hash().0
    }

    /// Sign with `wallet` and encode for broadcast.
    pub fn sign(&self, wallet: &Wallet) -> Result<SignedTransaction, CryptoError> {
        let tx = self.to_alloy();
        let sig = wallet.sign_hash(&tx.signature_hash().0)?;
        let raw = TxEnvelope::from(tx.into_signed(sig)).encoded_2718();
        let hash = keccak256(&raw);
        Ok(SignedTransaction { raw, hash })
    }
}
