use serde::{Deserialize, Serialize};
use toml_example::TomlExample;

#[derive(Serialize, Deserialize, Debug, Default, TomlExample)]
pub struct Push {
    /// Identifier of this device, passed to the server as is.
    ///  UPDATE THIS FIELD
    #[toml_example(default = "")]
    pub device_identifier: String,
    /// PEM encoded public key of this device.
    ///  UPDATE THIS FIELD
    #[toml_example(default = "")]
    pub device_public_key: String,
    #[toml_example(default = "rust")]
    pub app_type: String,
}
