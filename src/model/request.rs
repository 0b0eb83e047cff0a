use crate::error::{Error, Result};
use crate::model::{ClientProfile, Credential};

pub const INVALID_REGION: &str = "InvalidParameter.ResourceRegionError";
pub const INVALID_INSTANCE: &str = "InvalidParameter.ResourceError";
pub const INVALID_USER_NAME: &str = "InvalidParameter.UserNameIllegal";
pub const SECRET_NOT_EXIST: &str = "ResourceNotFound.SecretNotExist";

/// Everything needed to obtain a token for one database account.
///
/// Fields are checked once in [`GenerateTokenRequest::new`] and cannot change afterwards.
#[derive(Debug, Clone)]
pub struct GenerateTokenRequest {
    region: String,
    instance_id: String,
    user_name: String,
    credential: Credential,
    client_profile: Option<ClientProfile>,
}

impl GenerateTokenRequest {
    pub fn new(
        region: impl Into<String>,
        instance_id: impl Into<String>,
        user_name: impl Into<String>,
        credential: Credential,
        client_profile: Option<ClientProfile>,
    ) -> Result<Self> {
        let region = region.into();
        let instance_id = instance_id.into();
        let user_name = user_name.into();

        if region.is_empty() {
            return Err(Error::validation(INVALID_REGION, "region", "The region is invalid."));
        }
        if instance_id.is_empty() {
            return Err(Error::validation(INVALID_INSTANCE, "instance_id", "The instanceId is invalid."));
        }
        if user_name.is_empty() {
            return Err(Error::validation(INVALID_USER_NAME, "user_name", "The userName is invalid."));
        }
        if credential.secret_id.is_empty() || credential.secret_key.is_empty() {
            return Err(Error::validation(SECRET_NOT_EXIST, "credential", "The credential is invalid."));
        }

        Ok(Self {
            region,
            instance_id,
            user_name,
            credential,
            client_profile,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn client_profile(&self) -> Option<&ClientProfile> {
        self.client_profile.as_ref()
    }
}
