//! Signed session identifiers.
//!
//! Every WebSocket session gets a UUID v4 identifier. The identifier is handed
//! to the client as `"<uuid>.<hex hmac-sha256>"` so a reconnecting client can
//! present it again and keep the same identity in the logs.

use hmac::digest::Key;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Normalize a secret to one SHA-256 block the way HMAC does: longer keys
/// are hashed, shorter ones are zero-padded.
fn key_block(secret: &[u8]) -> Key<HmacSha256> {
    let mut block = Key::<HmacSha256>::default();
    if secret.len() > block.len() {
        let digest = <Sha256 as Digest>::digest(secret);
        block[..digest.len()].copy_from_slice(&digest);
    } else {
        block[..secret.len()].copy_from_slice(secret);
    }
    block
}

/// Mints and verifies signed session tokens.
#[derive(Clone)]
pub struct SessionSigner {
    mac: HmacSha256,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    /// Create a signer from a shared secret of any length.
    pub fn new(secret: &[u8]) -> Self {
        let key = key_block(secret);
        Self {
            mac: <HmacSha256 as Mac>::new(&key),
        }
    }

    /// Create a signer with a random per-process key.
    ///
    /// Tokens minted by one process are not accepted by the next one.
    pub fn random() -> Self {
        warn!("SECRET_KEY is not set; using a random per-process session key");
        let mut key = Zeroizing::new(Vec::with_capacity(32));
        key.extend_from_slice(Uuid::new_v4().as_bytes());
        key.extend_from_slice(Uuid::new_v4().as_bytes());
        Self::new(&key)
    }

    /// Build the signer for an optional configured secret.
    pub fn from_secret(secret: Option<&str>) -> Self {
        match secret {
            Some(secret) => Self::new(secret.as_bytes()),
            None => Self::random(),
        }
    }

    /// Mint a fresh session id and its signed token.
    pub fn mint(&self) -> (String, String) {
        let id = Uuid::new_v4().to_string();
        let token = self.sign(&id);
        (id, token)
    }

    /// Sign a session id, producing `"<id>.<hex mac>"`.
    pub fn sign(&self, session_id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(session_id.as_bytes());
        let tag = mac.finalize().into_bytes();
        format!("{session_id}.{}", hex::encode(tag))
    }

    /// Return the session id carried by `token` if its signature is valid.
    pub fn verify(&self, token: &str) -> Option<String> {
        let (id, tag_hex) = token.rsplit_once('.')?;
        Uuid::parse_str(id).ok()?;
        let tag = hex::decode(tag_hex).ok()?;

        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.verify_slice(&tag).ok()?;

        Some(id.to_string())
    }
}
