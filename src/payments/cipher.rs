//! Payload encryption for charge requests
//!
//! Triple-DES (EDE3) in ECB mode over 8-byte blocks, padded with bytes whose
//! value equals the pad length, then base64 encoded. ECB is deterministic and
//! leaks equality of repeated blocks; the gateway only accepts this format.

use crate::error::{RaveError, RaveResult};
use crate::payments::credentials::EncryptionKey;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use des::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use des::TdesEde3;

pub const BLOCK_SIZE: usize = 8;

/// Value of the `alg` field sent alongside the encrypted payload.
pub const ALGORITHM: &str = "3DES-24";

/// Pad to a whole number of blocks. Block-aligned input gains a full block.
fn pad(plain: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - (plain.len() % BLOCK_SIZE);
    let mut padded = Vec::with_capacity(plain.len() + pad_len);
    padded.extend_from_slice(plain);
    padded.resize(plain.len() + pad_len, pad_len as u8);
    padded
}

pub fn encrypt(plain_text: &str, key: &EncryptionKey) -> RaveResult<String> {
    let cipher = TdesEde3::new_from_slice(key.as_bytes())
        .map_err(|_| RaveError::configuration("Encryption key must be 24 bytes"))?;

    let mut buf = pad(plain_text.as_bytes());
    for block in buf.chunks_exact_mut(BLOCK_SIZE) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }

    Ok(STANDARD.encode(buf))
}
