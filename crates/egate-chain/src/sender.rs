//! Build, sign, broadcast, and confirm transactions from one wallet.

use egate_core::{EthAddress, Wei};
use egate_crypto::Wallet;

use crate::error::ChainError;
use crate::rpc::{CallRequest, RpcClient, TxReceipt};
use crate::tx::LegacyTransaction;

/// Sends legacy transactions signed by a local wallet.
///
/// Each send fetches chain id, nonce, and gas price fresh, estimates gas,
/// signs, broadcasts, then blocks on the receipt.
#[derive(Debug)]
pub struct TransactionSender {
    rpc: RpcClient,
    wallet: Wallet,
}

impl TransactionSender {
    pub fn new(rpc: RpcClient, wallet: Wallet) -> Self {
        Self { rpc, wallet }
    }

    /// The underlying RPC client.
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// The sending address.
    pub fn address(&self) -> EthAddress {
        self.wallet.address()
    }

    /// Send a transaction and wait for a successful receipt.
    ///
    /// `to: None` creates a contract from `data`.
    pub async fn send(
        &self,
        to: Option<EthAddress>,
        value: Wei,
        data: Vec<u8>,
    ) -> Result<TxReceipt, ChainError> {
        let from = self.wallet.address();
        let chain_id = self.rpc.chain_id().await?;
        let nonce = self.rpc.transaction_count(&from).await?;
        let gas_price = self.rpc.gas_price().await?;
        let gas_limit = self
            .rpc
            .estimate_gas(&CallRequest {
                from,
                to,
                value,
                data: data.clone(),
            })
            .await?;

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            chain_id,
        };
        let signed = tx.sign(&self.wallet)?;
        let tx_hash = self.rpc.send_raw_transaction(&signed.raw_hex()).await?;

        if !tx_hash.eq_ignore_ascii_case(&signed.hash_hex()) {
            tracing::warn!(
                returned = %tx_hash,
                computed = %signed.hash_hex(),
                "node returned a different transaction hash"
            );
        }
        tracing::info!(%from, nonce, gas_limit, chain_id, tx_hash = %tx_hash, "transaction broadcast");

        self.rpc.wait_for_receipt(&tx_hash).await
    }
}
