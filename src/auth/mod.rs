pub mod authenticator;
mod claims;
pub mod credentials;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod policy;

pub use authenticator::Principal;
