use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use thiserror::Error;

use crate::token::codec::{InvalidToken, SecretKey, SecretKeyError, Signer};

pub const CSRF_SALT: &str = "csrf-token";

/// Name of both the cookie and the hidden form field
pub const CSRF_TOKEN_NAME: &str = "csrf_token";

const NONCE_LENGTH: usize = 16;

#[derive(Error, Debug, PartialEq)]
pub enum CsrfError {
    #[error("The CSRF token is missing.")]
    Missing,

    #[error("The CSRF tokens do not match.")]
    Mismatch,

    #[error("The CSRF token is invalid.")]
    Invalid(InvalidToken),
}

/// Double-submit CSRF check for the add form
///
/// A token is a signed random nonce. It is handed out twice, once as a cookie and once as a hidden
/// form field; a submission is accepted when both copies are present, equal, and carry a valid
/// signature.
#[derive(Clone)]
pub struct CsrfGuard {
    signer: Option<Signer>,
}

impl CsrfGuard {
    pub fn new(secret: &SecretKey) -> Result<Self, SecretKeyError> {
        Ok(Self {
            signer: Some(Signer::new(secret, CSRF_SALT)?),
        })
    }

    pub fn disabled() -> Self {
        Self { signer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.signer.is_some()
    }

    /// Fresh token for a rendered form, `None` when the check is disabled
    pub fn issue(&self) -> Option<String> {
        let signer = self.signer.as_ref()?;

        let mut nonce = [0u8; NONCE_LENGTH];
        rand::thread_rng().fill_bytes(&mut nonce);

        Some(signer.sign(&URL_SAFE_NO_PAD.encode(nonce)))
    }

    pub fn verify(&self, submitted: Option<&str>, cookie: Option<&str>) -> Result<(), CsrfError> {
        let Some(signer) = &self.signer else {
            return Ok(());
        };

        let (submitted, cookie) = match (submitted, cookie) {
            (Some(submitted), Some(cookie)) if !submitted.is_empty() => (submitted, cookie),
            _ => return Err(CsrfError::Missing),
        };

        signer.unsign(submitted).map_err(CsrfError::Invalid)?;

        if submitted != cookie {
            return Err(CsrfError::Mismatch);
        }

        Ok(())
    }
}
