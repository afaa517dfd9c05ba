use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};

/// Payload the server answers a push registration with.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct NCReqDataPushDevice {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub signature: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub publicKey: String,
}

/// Device tokens handed to the server verbatim.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct NCPushDevice {
    pub device_identifier: String,
    pub device_public_key: String,
    pub app_type: String,
}

impl NCPushDevice {
    #[must_use]
    pub fn new(device_identifier: &str, device_public_key: &str, app_type: &str) -> Self {
        NCPushDevice {
            device_identifier: device_identifier.to_string(),
            device_public_key: device_public_key.to_string(),
            app_type: app_type.to_string(),
        }
    }

    /// Form parameters of the registration request, named as the server expects them.
    #[must_use]
    pub fn form_params(&self) -> [(&'static str, &str); 3] {
        [
            ("deviceIdentifier", self.device_identifier.as_str()),
            ("devicePublicKey", self.device_public_key.as_str()),
            ("appType", self.app_type.as_str()),
        ]
    }
}
