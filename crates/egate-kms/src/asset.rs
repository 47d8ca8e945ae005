//! # Condition-Gated Asset Encryption
//!
//! Encryption is local: a fresh AES-256-GCM key seals the asset and only the
//! key travels to the node, which wraps it under the condition set.
//! Decryption reverses that, after proving the signer's identity with a
//! session signature. The recovered plaintext must hash to the recorded
//! `dataToEncryptHash`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use egate_core::{sha256, ConditionSet, EncryptedAssetBundle, ValidationError};
use egate_crypto::{open, seal, SymmetricKey, Wallet};

use crate::client::KmsClient;
use crate::error::KmsError;
use crate::session::{SessionKey, SessionSigs};

/// Seal `plaintext` and have the node wrap its key under `conditions`.
pub async fn encrypt_asset(
    client: &KmsClient,
    conditions: &ConditionSet,
    chain: &str,
    plaintext: &[u8],
) -> Result<EncryptedAssetBundle, KmsError> {
    conditions.validate()?;
    let key = SymmetricKey::generate();
    let sealed = seal(&key, plaintext)?;
    let encrypted_key = client.store_encryption_key(conditions, &key, chain).await?;

    let bundle = EncryptedAssetBundle {
        ciphertext: BASE64.encode(sealed),
        data_to_encrypt_hash: hex::encode(sha256(plaintext)),
        encrypted_symmetric_key: hex::encode(encrypted_key),
    };
    tracing::info!(
        plaintext_len = plaintext.len(),
        hash = %bundle.data_to_encrypt_hash,
        "asset encrypted"
    );
    Ok(bundle)
}

/// Delegate from `wallet` to a fresh session key and sign for the node.
pub fn authorize(client: &KmsClient, wallet: &Wallet, chain: &str) -> Result<SessionSigs, KmsError> {
    let ttl = client.config().session_ttl_secs;
    let now = Utc::now();
    let session = SessionKey::generate();
    let capability = session.delegate(
        wallet,
        &client.domain(),
        chain,
        client.latest_blockhash(),
        now,
        ttl,
    )?;
    let node = client.config().node_key();
    let sig = session.sign_for_node(&node, &capability, now, ttl)?;

    tracing::debug!(
        signer = %wallet.address(),
        session_key = %session.public_key_hex(),
        ttl_secs = ttl,
        "session authorized"
    );
    let mut sigs = SessionSigs::new();
    sigs.insert(node, sig);
    Ok(sigs)
}

/// Recover the plaintext of `bundle` as `wallet`.
///
/// Fails with [`KmsError::AccessDenied`] while the conditions do not hold,
/// and with [`KmsError::HashMismatch`] if the plaintext does not match the
/// recorded hash.
pub async fn decrypt_asset(
    client: &KmsClient,
    wallet: &Wallet,
    conditions: &ConditionSet,
    bundle: &EncryptedAssetBundle,
    chain: &str,
) -> Result<Vec<u8>, KmsError> {
    conditions.validate()?;
    bundle.validate()?;
    let sealed = BASE64
        .decode(bundle.ciphertext.trim())
        .map_err(|e| ValidationError::InvalidBundle(format!("ciphertext is not base64: {e}")))?;
    let encrypted_key =
        egate_core::decode_hex_prefixed(&bundle.encrypted_symmetric_key, "encryptedSymmetricKey")?;

    let session_sigs = authorize(client, wallet, chain)?;
    let key = client
        .retrieve_encryption_key(conditions, &encrypted_key, chain, &session_sigs)
        .await?;
    let plaintext = open(&key, &sealed)?;

    if !bundle.matches_plaintext(&plaintext) {
        return Err(KmsError::HashMismatch {
            expected: bundle.data_to_encrypt_hash.trim().to_lowercase(),
            actual: hex::encode(sha256(&plaintext)),
        });
    }
    tracing::info!(plaintext_len = plaintext.len(), "asset decrypted and verified");
    Ok(plaintext)
}
