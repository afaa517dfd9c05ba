mod general;
mod push;

use general::General;
use push::Push;
use serde::{Deserialize, Serialize};
use toml_example::TomlExample;

#[derive(Serialize, Deserialize, Debug, Default, TomlExample)]
pub struct ConfigOptions {
    #[toml_example(nesting)]
    pub general: General,
    #[toml_example(nesting)]
    pub push: Push,
}
