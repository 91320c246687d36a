use base64::{URL_SAFE_NO_PAD, encode_config};
use jwt_simple::prelude::ES256KeyPair;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use thiserror::Error;

use crate::types::push::VapidConfig;

#[derive(Debug, Clone)]
pub struct VapidCredentials {
    pub private_key: String,
    pub public_key: String,
}

#[derive(Debug, Error)]
pub enum VapidError {
    #[error("VAPID private key is missing (run `pushcast init` to generate one)")]
    MissingPrivateKey,
    #[error("VAPID private key is invalid: {0}")]
    InvalidPrivateKey(web_push::WebPushError),
    #[error("VAPID public key does not match the private key")]
    PublicKeyMismatch,
}

/// Validates configured VAPID keys.
///
/// The public key is derived from the private key when absent; a supplied
/// public key has to match the derived one.
pub fn resolve_vapid_config(
    private_key: Option<&str>,
    public_key: Option<&str>,
    subject: String,
) -> Result<VapidConfig, VapidError> {
    let private_key = private_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(VapidError::MissingPrivateKey)?;
    let derived = derive_public_key(private_key).map_err(VapidError::InvalidPrivateKey)?;

    let public_key = match public_key.map(str::trim).filter(|key| !key.is_empty()) {
        Some(configured) if configured != derived => return Err(VapidError::PublicKeyMismatch),
        Some(configured) => configured.to_string(),
        None => derived,
    };

    Ok(VapidConfig {
        private_key: private_key.to_string(),
        public_key,
        subject,
    })
}

fn derive_public_key(private_key: &str) -> Result<String, web_push::WebPushError> {
    let public_key =
        web_push::VapidSignatureBuilder::from_base64_no_sub(private_key, URL_SAFE_NO_PAD)?
            .get_public_key();
    Ok(encode_config(public_key, URL_SAFE_NO_PAD))
}

pub fn generate_vapid_credentials() -> Result<VapidCredentials, web_push::WebPushError> {
    let mut rng = OsRng;
    generate_vapid_credentials_with_rng(&mut rng)
}

pub(crate) fn generate_vapid_credentials_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<VapidCredentials, web_push::WebPushError> {
    let key_pair = generate_es256_keypair_with_rng(rng);
    let private_key = encode_config(key_pair.to_bytes(), URL_SAFE_NO_PAD);
    let public_key = derive_public_key(&private_key)?;

    Ok(VapidCredentials {
        private_key,
        public_key,
    })
}

fn generate_es256_keypair_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> ES256KeyPair {
    let mut key_bytes = [0u8; 32];
    loop {
        rng.fill_bytes(&mut key_bytes);
        if let Ok(key_pair) = ES256KeyPair::from_bytes(&key_bytes) {
            return key_pair;
        }
    }
}
