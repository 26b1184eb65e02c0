//! Stateless token authentication for the Botnology services.
//!
//! Tokens are `base64url(json_claims).base64url(hmac_sha256)`. Nothing is kept
//! server side: a token is valid if its signature matches under the
//! configured secret.

mod claims;
mod config;
mod token;

pub use claims::{Claims, Plan};
pub use config::AuthConfig;
pub use token::{decode_token, encode_token, TokenService};
