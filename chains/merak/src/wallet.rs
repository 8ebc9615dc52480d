//! Sui Ed25519 wallets derived from BIP-39 mnemonics.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bip39::Mnemonic;
use blake2::{digest::consts::U32, Blake2b, Digest};
use core_logic::{WalletCredential, WalletError};
use ed25519_dalek::{Signer, SigningKey};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::fmt;
use zeroize::Zeroizing;

type Blake2b256 = Blake2b<U32>;
type HmacSha512 = Hmac<Sha512>;

/// m/44'/784'/0'/0'/0'
const DERIVATION_PATH: [u32; 5] = [44, 784, 0, 0, 0];
const HARDENED: u32 = 0x8000_0000;
const ED25519_FLAG: u8 = 0x00;
/// TransactionData intent: scope, version, app id
const TX_INTENT: [u8; 3] = [0, 0, 0];

#[derive(Clone)]
pub struct SuiKeypair {
    signing_key: SigningKey,
    address: String,
}

impl SuiKeypair {
    pub fn from_mnemonic(phrase: &str) -> Result<Self, WalletError> {
        let mnemonic =
            Mnemonic::parse_normalized(phrase).map_err(|e| WalletError::InvalidMnemonic {
                reason: e.to_string(),
            })?;
        let seed = Zeroizing::new(mnemonic.to_seed_normalized(""));
        let secret = derive_ed25519(&seed[..])?;
        Ok(Self::from_secret(&secret))
    }

    pub fn from_secret(secret: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(secret);
        let address = sui_address(signing_key.verifying_key().as_bytes());
        Self {
            signing_key,
            address,
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Serialized signature over `tx_bytes`: `base64(flag || sig || pk)`.
    pub fn sign_transaction(&self, tx_bytes: &[u8]) -> String {
        let digest = Blake2b256::new()
            .chain_update(TX_INTENT)
            .chain_update(tx_bytes)
            .finalize();
        let signature = self.signing_key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(&self.public_key());
        STANDARD.encode(serialized)
    }
}

impl WalletCredential for SuiKeypair {
    fn address(&self) -> String {
        self.address.clone()
    }
}

impl fmt::Debug for SuiKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiKeypair")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// `0x` + hex(blake2b-256(flag || pk))
pub fn sui_address(public_key: &[u8]) -> String {
    let hash = Blake2b256::new()
        .chain_update([ED25519_FLAG])
        .chain_update(public_key)
        .finalize();
    format!("0x{}", hex::encode(hash))
}

/// SLIP-0010 hardened derivation for Ed25519.
fn derive_ed25519(seed: &[u8]) -> Result<Zeroizing<[u8; 32]>, WalletError> {
    let (mut key, mut chain_code) = hmac_split(b"ed25519 seed", &[seed])?;

    for index in DERIVATION_PATH {
        let index = (index | HARDENED).to_be_bytes();
        let (k, c) = hmac_split(&chain_code[..], &[&[0u8][..], &key[..], &index[..]])?;
        key = k;
        chain_code = c;
    }

    Ok(key)
}

fn hmac_split(
    key: &[u8],
    parts: &[&[u8]],
) -> Result<(Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>), WalletError> {
    let mut mac = HmacSha512::new_from_slice(key).map_err(|e| WalletError::DerivationFailed {
        reason: e.to_string(),
    })?;
    for part in parts {
        mac.update(part);
    }
    let mut output = Zeroizing::new([0u8; 64]);
    output.copy_from_slice(&mac.finalize().into_bytes());

    let mut left = Zeroizing::new([0u8; 32]);
    let mut right = Zeroizing::new([0u8; 32]);
    left.copy_from_slice(&output[..32]);
    right.copy_from_slice(&output[32..]);
    Ok((left, right))
}
