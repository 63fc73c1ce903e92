use actix_web::web;
use database::database::request_manager::RequestManager;

use crate::{
    form::csrf::CsrfGuard,
    token::codec::{SecretKey, SecretKeyError, TokenCodec},
};

use super::routes::{add_form, add_submit, delete, index};

/// Everything a handler needs, built once at startup and shared by every worker
#[derive(Clone)]
pub struct AppState {
    pub request_manager: RequestManager,
    pub tokens: TokenCodec,
    pub csrf: CsrfGuard,
}

impl AppState {
    pub fn new(
        request_manager: RequestManager,
        secret: &SecretKey,
        csrf_enabled: bool,
    ) -> Result<Self, SecretKeyError> {
        let csrf = match csrf_enabled {
            true => CsrfGuard::new(secret)?,
            false => CsrfGuard::disabled(),
        };

        Ok(Self {
            request_manager,
            tokens: TokenCodec::new(secret)?,
            csrf,
        })
    }
}

/// Registers the list, add and delete routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(add_form)
        .service(add_submit)
        .service(delete);
}
