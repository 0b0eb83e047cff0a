/// Credential material embedded in an issued token.
#[derive(Clone, PartialEq, prost::Message)]
pub struct AuthTokenInfo {
    #[prost(string, tag = "1")]
    pub password: String,
}
