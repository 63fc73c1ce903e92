pub mod clients;
pub mod form;
pub mod templates;
pub mod token;
