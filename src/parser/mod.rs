pub mod auth_token;
pub mod payload;

pub use auth_token::{parse_auth_token, UnwrapError};
pub use payload::AuthTokenInfo;
