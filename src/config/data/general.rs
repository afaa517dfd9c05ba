use serde::{Deserialize, Serialize};
use toml_example::TomlExample;

#[derive(Serialize, Deserialize, Debug, Default, TomlExample)]
pub struct General {
    /// Base url of your Nextcloud server, including a sub path if it has one.
    ///  UPDATE THIS FIELD
    #[toml_example(default = "https://butz.com/")]
    pub url: String,
    /// User name to log in with.
    ///  UPDATE THIS FIELD
    #[toml_example(default = "dummy_user")]
    pub user: String,
    /// App password created in the security settings of your Nextcloud user.
    ///  UPDATE THIS FIELD
    #[toml_example(default = "foobar-asdasd-asdsf")]
    pub app_pw: String,
    /// Identifier handed back with every answer, e.g. `user@server`.
    #[toml_example(default = "")]
    pub account: String,
    /// User agent to send instead of the default one.
    #[toml_example(default = "")]
    pub user_agent: String,
    /// Additional headers as `"Name: Value"`.
    #[serde(default)]
    pub custom_headers: Vec<String>,
    #[toml_example(default = false)]
    pub dump_failed_requests_to_file: bool,
    #[toml_example(default = false)]
    pub log_to_file: bool,
}
