use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::error::{BotError, ErrorKind, Result};

pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";
pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";

/// Public key as supplied in configuration: raw 32 bytes or their hex encoding.
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    Bytes(Vec<u8>),
    Hex(String),
}

impl From<&str> for KeyMaterial {
    fn from(hex: &str) -> Self {
        Self::Hex(hex.to_string())
    }
}

impl From<String> for KeyMaterial {
    fn from(hex: String) -> Self {
        Self::Hex(hex)
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

pub fn decode_public_key(material: &KeyMaterial) -> Result<VerifyingKey> {
    let bytes = match material {
        KeyMaterial::Bytes(bytes) => bytes.clone(),
        KeyMaterial::Hex(hex) => hex::decode(hex.trim())
            .map_err(|e| BotError::kind(ErrorKind::InvalidPublicKey).push_std(e))?,
    };

    let bytes: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        BotError::kind(ErrorKind::InvalidPublicKey)
            .push_str(format!("expected 32 bytes, got {}", bytes.len()))
    })?;

    VerifyingKey::from_bytes(&bytes).map_err(|e| BotError::kind(ErrorKind::InvalidPublicKey).push_std(e))
}

/// Verify an incoming interaction's Ed25519 signature over `timestamp || body`.
///
/// Runs on the raw body before anything is parsed. Malformed hex or a
/// signature of the wrong length is a failed verification, never an error.
pub fn verify(public_key: &VerifyingKey, timestamp: &str, signature: &str, body: &[u8]) -> bool {
    let Ok(signature_bytes) = hex::decode(signature) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(&signature_bytes) else {
        return false;
    };

    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);

    public_key.verify(&message, &signature).is_ok()
}
