use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, DefaultOnError};
use std::convert::TryFrom;

use super::NC_ERROR_INTERNAL;

/// Outer `{"ocs": {...}}` frame every OCS endpoint answers with.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct NCReqOCSWrapper<T> {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub ocs: NCReqOCS<T>,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct NCReqOCS<T> {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub meta: NCReqMeta,
    // Nextcloud sends `[]` instead of an object when there is no payload.
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub data: T,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct NCReqMeta {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "number_or_none")]
    pub statuscode: Option<i32>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub message: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub errorDescription: Option<String>,
}

/// Any JSON number that fits an `i32` once the fraction is dropped, `None` for everything else.
fn number_or_none<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NCReqStatusCode {
        Number(serde_json::Number),
        Other(serde::de::IgnoredAny),
    }

    Ok(match NCReqStatusCode::deserialize(deserializer)? {
        NCReqStatusCode::Number(number) => match number.as_i64() {
            Some(int) => i32::try_from(int).ok(),
            None => number.as_f64().and_then(truncate_to_i32),
        },
        NCReqStatusCode::Other(_) => None,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn truncate_to_i32(value: f64) -> Option<i32> {
    if (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&value) {
        Some(value.trunc() as i32)
    } else {
        None
    }
}

impl NCReqMeta {
    /// Status embedded by the server, [`NC_ERROR_INTERNAL`] if it is missing or not a number.
    #[must_use]
    pub fn status_code(&self) -> i32 {
        self.statuscode.unwrap_or(NC_ERROR_INTERNAL)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code())
    }
}
