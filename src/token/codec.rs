use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use database::consts::consts::PersonId;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Salt of delete links, keeps them from verifying as any other kind of token
pub const DELETE_LINK_SALT: &str = "delete-link";

const SEPARATOR: char = '.';

const RANDOM_SECRET_LENGTH: usize = 32;

#[derive(Error, Debug, PartialEq)]
pub enum InvalidToken {
    #[error("No \"{}\" found in token", SEPARATOR)]
    MissingSeparator,

    #[error("Token is not valid base64: {0}")]
    Encoding(String),

    #[error("Signature does not match")]
    BadSignature,

    #[error("Token payload is malformed: {0}")]
    Payload(String),
}

#[derive(Error, Debug)]
pub enum SecretKeyError {
    #[error("Secret key must not be empty")]
    Empty,

    #[error("Secret key cannot be used for signing: {0}")]
    InvalidLength(String),
}

/// Process-wide signing secret, read from configuration once at startup
#[derive(Clone)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Tokens signed with a random secret stop verifying after a restart
    pub fn random() -> Self {
        let mut bytes = vec![0u8; RANDOM_SECRET_LENGTH];
        rand::thread_rng().fill_bytes(&mut bytes);

        SecretKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<String> for SecretKey {
    fn from(secret: String) -> Self {
        SecretKey(secret.into_bytes())
    }
}

impl From<&str> for SecretKey {
    fn from(secret: &str) -> Self {
        SecretKey(secret.as_bytes().to_vec())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// HMAC-SHA256 signer producing `payload.signature` strings
///
/// The salt is mixed into every signature so signers sharing a secret but not a salt reject each
/// other's output.
#[derive(Clone)]
pub struct Signer {
    mac: HmacSha256,
    salt: &'static str,
}

impl Signer {
    pub fn new(secret: &SecretKey, salt: &'static str) -> Result<Self, SecretKeyError> {
        if secret.as_bytes().is_empty() {
            return Err(SecretKeyError::Empty);
        }

        Ok(Self {
            mac: HmacSha256::new_from_slice(secret.as_bytes())
                .map_err(|e| SecretKeyError::InvalidLength(e.to_string()))?,
            salt,
        })
    }

    fn mac_for(&self, payload: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(self.salt.as_bytes());
        mac.update(&[SEPARATOR as u8]);
        mac.update(payload.as_bytes());
        mac
    }

    /// `payload` must not contain the separator, base64url output never does
    pub fn sign(&self, payload: &str) -> String {
        let signature = self.mac_for(payload).finalize().into_bytes();

        format!(
            "{}{}{}",
            payload,
            SEPARATOR,
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    /// Returns the payload once the signature has been checked in constant time
    pub fn unsign<'a>(&self, token: &'a str) -> Result<&'a str, InvalidToken> {
        let (payload, signature) = token
            .rsplit_once(SEPARATOR)
            .ok_or(InvalidToken::MissingSeparator)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| InvalidToken::Encoding(e.to_string()))?;

        self.mac_for(payload)
            .verify_slice(&signature)
            .map_err(|_| InvalidToken::BadSignature)?;

        Ok(payload)
    }
}

/// Turns person ids into opaque delete-link tokens and back
///
/// Tokens are deterministic and never expire: the same id always yields the same token for a
/// given secret.
#[derive(Clone)]
pub struct TokenCodec {
    signer: Signer,
}

impl TokenCodec {
    pub fn new(secret: &SecretKey) -> Result<Self, SecretKeyError> {
        Ok(Self {
            signer: Signer::new(secret, DELETE_LINK_SALT)?,
        })
    }

    pub fn encode(&self, id: PersonId) -> String {
        // JSON of an integer is its decimal form
        let payload = URL_SAFE_NO_PAD.encode(id.to_number().to_string());

        self.signer.sign(&payload)
    }

    pub fn decode(&self, token: &str) -> Result<PersonId, InvalidToken> {
        let payload = self.signer.unsign(token)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| InvalidToken::Encoding(e.to_string()))?;

        serde_json::from_slice::<PersonId>(&json).map_err(|e| InvalidToken::Payload(e.to_string()))
    }
}
