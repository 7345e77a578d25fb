pub mod authenticator;
pub mod pkce;

pub use authenticator::{Authenticator, AuthorizationRequest, LoginOutcome};
pub use pkce::PkceChallenge;
