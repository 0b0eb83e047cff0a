pub mod credential;
pub mod profile;
pub mod request;

pub use credential::Credential;
pub use profile::ClientProfile;
pub use request::GenerateTokenRequest;
