use base64::{prelude::BASE64_STANDARD, write::EncoderWriter};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT},
    Url,
};
use std::collections::HashMap;
use std::io::Write;

use super::NCPushError;

const DEFAULT_USER_AGENT: &str = concat!("ncpush-rs/", env!("CARGO_PKG_VERSION"));

/// Everything needed to talk to one Nextcloud account.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NCAccount {
    pub server_url: String,
    /// Opaque identifier handed back with every reply.
    pub account: String,
    pub user: String,
    pub password: String,
    pub user_agent: Option<String>,
    pub custom_headers: HashMap<String, String>,
}

impl NCAccount {
    #[must_use]
    pub fn new(server_url: &str, account: &str, user: &str, password: &str) -> Self {
        NCAccount {
            server_url: server_url.to_string(),
            account: account.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            ..Default::default()
        }
    }

    /// Resolve `endpoint` below this account's server.
    ///
    /// # Errors
    ///
    /// [`NCPushError::InvalidUrl`] if the server url is empty or not an http(s) url.
    pub fn create_standard_url(&self, endpoint: &str) -> Result<Url, NCPushError> {
        create_standard_url(&self.server_url, endpoint)
    }

    /// Basic auth, OCS and user agent headers followed by the custom headers.
    #[must_use]
    pub fn standard_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("OCS-APIRequest", HeaderValue::from_static("true"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut buf = b"Basic ".to_vec();
        {
            let mut encoder = EncoderWriter::new(&mut buf, &BASE64_STANDARD);
            // Writing into a Vec cannot fail.
            let _ = write!(encoder, "{}:{}", self.user, self.password);
        }
        match HeaderValue::from_bytes(&buf) {
            Ok(mut auth_value) => {
                auth_value.set_sensitive(true);
                headers.insert(AUTHORIZATION, auth_value);
            }
            Err(why) => log::warn!("Could not build auth header: {why}"),
        }

        let user_agent = self
            .user_agent
            .as_deref()
            .filter(|agent| !agent.is_empty())
            .unwrap_or(DEFAULT_USER_AGENT);
        match HeaderValue::from_str(user_agent) {
            Ok(value) => {
                headers.insert(USER_AGENT, value);
            }
            Err(why) => {
                log::warn!("Ignoring user agent {user_agent:?}: {why}");
                headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
            }
        }

        for (name, value) in &self.custom_headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => log::warn!("Skipping invalid custom header {name:?}"),
            }
        }
        headers
    }
}

/// Join `endpoint` onto `server_url`, keeping any sub path the server is installed under.
///
/// # Errors
///
/// [`NCPushError::InvalidUrl`] if the server url is empty or not an http(s) url with a host.
pub fn create_standard_url(server_url: &str, endpoint: &str) -> Result<Url, NCPushError> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err(NCPushError::InvalidUrl(server_url.to_string()));
    }
    let base = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let base = Url::parse(&base).map_err(|why| {
        log::debug!("Failed to parse {server_url:?}: {why}");
        NCPushError::InvalidUrl(server_url.to_string())
    })?;
    if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
        return Err(NCPushError::InvalidUrl(server_url.to_string()));
    }
    base.join(endpoint.trim_start_matches('/'))
        .map_err(|_| NCPushError::InvalidUrl(server_url.to_string()))
}
