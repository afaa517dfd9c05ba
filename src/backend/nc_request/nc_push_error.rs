use reqwest::StatusCode;
use thiserror::Error;

/// The server url could not be turned into a request url.
pub const NC_ERROR_BAD_URL: i32 = -1000;
pub const NC_ERROR_TIMED_OUT: i32 = -1001;
pub const NC_ERROR_CANNOT_CONNECT: i32 = -1004;
pub const NC_ERROR_CANNOT_PARSE_RESPONSE: i32 = -1017;
pub const NC_ERROR_UNKNOWN: i32 = -1;
/// Stand-in for a status the server did not send, and for failures inside this crate.
pub const NC_ERROR_INTERNAL: i32 = -99999;

pub const INVALID_URL_DESCRIPTION: &str = "Invalid server url";
pub const INVALID_DATA_FORMAT_DESCRIPTION: &str = "Invalid data format";

#[derive(Error, Debug)]
pub enum NCPushError {
    #[error("Invalid server url: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded with status {status}")]
    HttpStatus { status: StatusCode },

    #[error("Response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Server reported status {statuscode}: {description}")]
    Server { statuscode: i32, description: String },

    #[error("Request worker is not running")]
    WorkerGone,
}

impl NCPushError {
    /// Single integer code space shared with the server's own status codes.
    #[must_use]
    pub fn error_code(&self) -> i32 {
        match self {
            NCPushError::InvalidUrl(_) => NC_ERROR_BAD_URL,
            NCPushError::Transport(why) => {
                if let Some(status) = why.status() {
                    i32::from(status.as_u16())
                } else if why.is_timeout() {
                    NC_ERROR_TIMED_OUT
                } else if why.is_connect() {
                    NC_ERROR_CANNOT_CONNECT
                } else if why.is_builder() {
                    NC_ERROR_BAD_URL
                } else if why.is_body() || why.is_decode() {
                    NC_ERROR_CANNOT_PARSE_RESPONSE
                } else {
                    NC_ERROR_UNKNOWN
                }
            }
            NCPushError::HttpStatus { status } => i32::from(status.as_u16()),
            NCPushError::Decode(_) => NC_ERROR_CANNOT_PARSE_RESPONSE,
            NCPushError::Server { statuscode, .. } => *statuscode,
            NCPushError::WorkerGone => NC_ERROR_INTERNAL,
        }
    }

    /// Human readable text for [`NCPushError::error_code`], never empty.
    #[must_use]
    pub fn error_description(&self) -> String {
        match self {
            NCPushError::InvalidUrl(_) => INVALID_URL_DESCRIPTION.to_string(),
            NCPushError::Transport(why) => {
                if let Some(status) = why.status() {
                    status_description(status)
                } else if why.is_timeout() {
                    "The request timed out.".to_string()
                } else if why.is_connect() {
                    "Could not connect to the server.".to_string()
                } else if why.is_builder() {
                    INVALID_URL_DESCRIPTION.to_string()
                } else if why.is_body() || why.is_decode() {
                    "Cannot parse response".to_string()
                } else {
                    why.to_string()
                }
            }
            NCPushError::HttpStatus { status } => status_description(*status),
            NCPushError::Decode(_) => INVALID_DATA_FORMAT_DESCRIPTION.to_string(),
            NCPushError::Server { description, .. } => description.clone(),
            NCPushError::WorkerGone => self.to_string(),
        }
    }
}

fn status_description(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP error {}", status.as_u16()), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_sentinel() {
        let err = NCPushError::InvalidUrl("nope".to_string());
        assert_eq!(err.error_code(), NC_ERROR_BAD_URL);
        assert_eq!(err.error_description(), "Invalid server url");
    }

    #[test]
    fn http_status_uses_reason_phrase() {
        let err = NCPushError::HttpStatus {
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(err.error_code(), 404);
        assert_eq!(err.error_description(), "Not Found");

        let odd = NCPushError::HttpStatus {
            status: StatusCode::from_u16(599).unwrap(),
        };
        assert_eq!(odd.error_code(), 599);
        assert_eq!(odd.error_description(), "HTTP error 599");
    }

    #[test]
    fn server_error_passes_through() {
        let err = NCPushError::Server {
            statuscode: 403,
            description: "Forbidden".to_string(),
        };
        assert_eq!(err.error_code(), 403);
        assert_eq!(err.error_description(), "Forbidden");
    }

    #[test]
    fn decode_and_worker_errors() {
        let decode = NCPushError::from(serde_json::from_str::<u8>("<html>").unwrap_err());
        assert_eq!(decode.error_code(), NC_ERROR_CANNOT_PARSE_RESPONSE);
        assert_eq!(decode.error_description(), INVALID_DATA_FORMAT_DESCRIPTION);

        assert_eq!(NCPushError::WorkerGone.error_code(), NC_ERROR_INTERNAL);
        assert!(!NCPushError::WorkerGone.error_description().is_empty());
    }
}
