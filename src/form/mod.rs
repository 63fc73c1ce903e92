pub mod csrf;
pub mod validator;
