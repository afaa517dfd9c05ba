use crate::config::Config;
use reqwest::{Client, Response, StatusCode};
use std::error::Error;
use std::path::PathBuf;

use super::*;

pub const PUSH_ENDPOINT: &str = "ocs/v2.php/apps/notifications/api/v2/push";

#[derive(Debug)]
pub struct NCRequestWorker {
    client: Client,
    json_dump_path: Option<PathBuf>,
}

impl NCRequestWorker {
    /// # Errors
    ///
    /// Fails if the TLS backend of the HTTP client cannot be initialised.
    pub fn new(config: &Config) -> Result<NCRequestWorker, NCPushError> {
        let client = Client::builder().build()?;

        log::debug!("Worker Ready");

        Ok(NCRequestWorker {
            client,
            json_dump_path: config.get_http_dump_dir(),
        })
    }

    /// Register a device for push notifications.
    ///
    /// # Errors
    ///
    /// Any [`NCPushError`], including the server's own status if it refused the device.
    pub async fn subscribe_push(
        &self,
        account: &NCAccount,
        device: &NCPushDevice,
    ) -> Result<NCReqDataPushDevice, NCPushError> {
        let mut url = account.create_standard_url(PUSH_ENDPOINT)?;
        url.query_pairs_mut().append_pair("format", "json");
        log::debug!("Subscribing {} at {}", account.account, url);

        let response = self
            .client
            .post(url.clone())
            .headers(account.standard_headers())
            .form(&device.form_params())
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        log::debug!("{url} answered {status}: {text}");

        if status.is_success() {
            match interpret_push_response(&text) {
                Err(NCPushError::Decode(why)) => {
                    self.dump_json_to_log(url.as_str(), &text);
                    Err(NCPushError::Decode(why))
                }
                result => result,
            }
        } else {
            Err(interpret_failed_status(status, &text))
        }
    }

    /// Remove the push registration of the account's device.
    ///
    /// # Errors
    ///
    /// Any [`NCPushError`]; every 2xx answer counts as success.
    pub async fn unsubscribe_push(&self, account: &NCAccount) -> Result<(), NCPushError> {
        let url = account.create_standard_url(PUSH_ENDPOINT)?;
        log::debug!("Unsubscribing {} at {}", account.account, url);

        let response = self
            .client
            .delete(url.clone())
            .headers(account.standard_headers())
            .send()
            .await?;
        log::debug!("{} answered {}", url, response.status());
        check_status(response).map(|_| ())
    }

    fn dump_json_to_log(&self, url: &str, text: &str) {
        if let Some(path) = &self.json_dump_path {
            if let Err(why) = write_dump(path, url, text) {
                log::warn!("Could not dump response of {url}: {why}");
            }
        }
    }
}

fn write_dump(dir: &std::path::Path, url: &str, text: &str) -> Result<(), Box<dyn Error>> {
    use std::io::Write;

    let name: String = url
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '.' { ch } else { '_' })
        .collect();
    std::fs::create_dir_all(dir)?;
    let mut file = std::fs::File::create(dir.join(name))?;
    // Not every broken body is JSON, keep those as they came.
    let pretty_text = jzon::parse(text)
        .map_or_else(|_| text.to_string(), |json| jzon::stringify_pretty(json, 2));
    file.write_all(pretty_text.as_bytes())?;
    Ok(())
}

fn check_status(response: Response) -> Result<Response, NCPushError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(NCPushError::HttpStatus { status })
    }
}

/// Classify a 2xx registration answer by the status the server framed into its envelope.
///
/// # Errors
///
/// [`NCPushError::Decode`] if the body is not JSON, [`NCPushError::Server`] if the
/// envelope status is outside `200..300` or missing.
pub fn interpret_push_response(text: &str) -> Result<NCReqDataPushDevice, NCPushError> {
    let json = serde_json::from_str::<serde_json::Value>(text)?;
    // Valid JSON that is no envelope at all is treated like one without a status.
    let parsed: NCReqOCSWrapper<NCReqDataPushDevice> =
        serde_json::from_value(json).unwrap_or_default();
    let NCReqOCS { meta, data } = parsed.ocs;
    if meta.is_success() {
        Ok(data)
    } else {
        Err(server_error(&meta))
    }
}

/// A non-2xx answer still carries the server's reason if it came as an envelope.
fn interpret_failed_status(status: StatusCode, text: &str) -> NCPushError {
    match serde_json::from_str::<NCReqOCSWrapper<serde_json::Value>>(text) {
        Ok(parsed) if parsed.ocs.meta.statuscode.is_some() && !parsed.ocs.meta.is_success() => {
            server_error(&parsed.ocs.meta)
        }
        _ => NCPushError::HttpStatus { status },
    }
}

fn server_error(meta: &NCReqMeta) -> NCPushError {
    NCPushError::Server {
        statuscode: meta.status_code(),
        description: meta
            .errorDescription
            .clone()
            .unwrap_or_else(|| INVALID_DATA_FORMAT_DESCRIPTION.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::init;
    use wiremock::{
        matchers::{
            body_string_contains, header, method, path, query_param, query_param_is_missing,
        },
        Mock, MockServer, ResponseTemplate,
    };

    const PUSH_PATH: &str = "/ocs/v2.php/apps/notifications/api/v2/push";

    fn worker() -> NCRequestWorker {
        NCRequestWorker {
            client: Client::new(),
            json_dump_path: None,
        }
    }

    fn account(server_url: &str) -> NCAccount {
        NCAccount::new(server_url, "me@cloud", "me", "secret")
    }

    fn device() -> NCPushDevice {
        NCPushDevice::new("device-1", "PUBKEY", "rust")
    }

    #[tokio::test]
    async fn new_requester() {
        let dir = tempfile::tempdir().unwrap();

        std::env::set_var("HOME", dir.path().as_os_str());
        let config = init("./test/").unwrap();
        let result = NCRequestWorker::new(&config);
        assert!(result.is_ok());
    }

    #[test]
    fn interpret_success() {
        let data = interpret_push_response(
            r#"{"ocs":{"meta":{"statuscode":200},"data":{"signature":"S","publicKey":"P"}}}"#,
        )
        .unwrap();
        assert_eq!(data.signature, "S");
        assert_eq!(data.publicKey, "P");
    }

    #[test]
    fn interpret_application_error() {
        let err = interpret_push_response(
            r#"{"ocs":{"meta":{"statuscode":403,"errorDescription":"Forbidden"}}}"#,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), 403);
        assert_eq!(err.error_description(), "Forbidden");
    }

    #[test]
    fn interpret_missing_description() {
        let err = interpret_push_response(r#"{"ocs":{"meta":{"statuscode":400},"data":[]}}"#)
            .unwrap_err();
        assert_eq!(err.error_code(), 400);
        assert_eq!(err.error_description(), "Invalid data format");
    }

    #[test]
    fn interpret_missing_statuscode() {
        let err = interpret_push_response(r#"{"ocs":{"meta":{"status":"ok"}}}"#).unwrap_err();
        assert_eq!(err.error_code(), NC_ERROR_INTERNAL);
    }

    #[test]
    fn interpret_malformed_envelopes() {
        for text in [
            r#"{"ocs":{"meta":null}}"#,
            r#"{"ocs":null}"#,
            r#"{"ocs":"x"}"#,
            r#"{"ocs":{"meta":{"statuscode":"200"}}}"#,
            "[]",
            "\"x\"",
        ] {
            let err = interpret_push_response(text).unwrap_err();
            assert_eq!(err.error_code(), NC_ERROR_INTERNAL, "{:?}", text);
            assert_eq!(err.error_description(), "Invalid data format");
        }
    }

    #[test]
    fn interpret_float_statuscode() {
        let data = interpret_push_response(
            r#"{"ocs":{"meta":{"statuscode":200.0},"data":{"signature":"S","publicKey":"P"}}}"#,
        )
        .unwrap();
        assert_eq!(data.signature, "S");
        assert_eq!(data.publicKey, "P");
    }

    #[test]
    fn failed_status_with_success_envelope() {
        let err = interpret_failed_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"ocs":{"meta":{"statuscode":200}}}"#,
        );
        assert_eq!(err.error_code(), 500);
        assert_eq!(err.error_description(), "Internal Server Error");
    }

    #[test]
    fn interpret_not_json() {
        let err = interpret_push_response("<html></html>").unwrap_err();
        assert!(matches!(err, NCPushError::Decode(_)));
    }

    #[tokio::test]
    async fn subscribe_sends_form() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ocs/v2.php/apps/notifications/api/v2/push"))
            .and(query_param("format", "json"))
            .and(header("OCS-APIRequest", "true"))
            .and(header("Authorization", "Basic bWU6c2VjcmV0"))
            .and(body_string_contains("deviceIdentifier=device-1"))
            .and(body_string_contains("devicePublicKey=PUBKEY"))
            .and(body_string_contains("appType=rust"))
            .respond_with(ResponseTemplate::new(201).set_body_string(
                r#"{"ocs":{"meta":{"status":"ok","statuscode":201},"data":{"signature":"S","publicKey":"P"}}}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let data = worker()
            .subscribe_push(&account(&mock_server.uri()), &device())
            .await
            .unwrap();
        assert_eq!(data.signature, "S");
        assert_eq!(data.publicKey, "P");
    }

    #[tokio::test]
    async fn subscribe_below_sub_path() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/nextcloud/ocs/v2.php/apps/notifications/api/v2/push"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"ocs":{"meta":{"statuscode":200},"data":{"signature":"S","publicKey":"P"}}}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let server_url = format!("{}/nextcloud", mock_server.uri());
        let result = worker().subscribe_push(&account(&server_url), &device()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn subscribe_http_error_with_envelope() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"ocs":{"meta":{"statuscode":400,"errorDescription":"Invalid device identifier"},"data":[]}}"#,
            ))
            .mount(&mock_server)
            .await;

        let err = worker()
            .subscribe_push(&account(&mock_server.uri()), &device())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), 400);
        assert_eq!(err.error_description(), "Invalid device identifier");
    }

    #[tokio::test]
    async fn subscribe_http_error_without_envelope() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&mock_server)
            .await;

        let err = worker()
            .subscribe_push(&account(&mock_server.uri()), &device())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), 502);
        assert_eq!(err.error_description(), "Bad Gateway");
    }

    #[tokio::test]
    async fn subscribe_bad_url() {
        let err = worker()
            .subscribe_push(&account("::not-an-url::"), &device())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), NC_ERROR_BAD_URL);
    }

    #[tokio::test]
    async fn unsubscribe_bad_url() {
        let err = worker()
            .unsubscribe_push(&account("::not-an-url::"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), NC_ERROR_BAD_URL);
        assert_eq!(err.error_description(), "Invalid server url");
    }

    #[tokio::test]
    async fn bad_url_sends_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(path(PUSH_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;
        // Same host and port as the mock server, but a scheme that is refused.
        let server_url = mock_server.uri().replacen("http", "ftp", 1);

        let subscribe = worker()
            .subscribe_push(&account(&server_url), &device())
            .await
            .unwrap_err();
        let unsubscribe = worker()
            .unsubscribe_push(&account(&server_url))
            .await
            .unwrap_err();
        assert_eq!(subscribe.error_code(), NC_ERROR_BAD_URL);
        assert_eq!(unsubscribe.error_code(), NC_ERROR_BAD_URL);
        mock_server.verify().await;
    }

    #[tokio::test]
    async fn failed_body_is_dumped() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let worker = NCRequestWorker {
            client: Client::new(),
            json_dump_path: Some(dir.path().to_path_buf()),
        };
        let err = worker
            .subscribe_push(&account(&mock_server.uri()), &device())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), NC_ERROR_CANNOT_PARSE_RESPONSE);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn unsubscribe_ignores_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/ocs/v2.php/apps/notifications/api/v2/push"))
            .and(query_param_is_missing("format"))
            .and(header("OCS-APIRequest", "true"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = worker().unsubscribe_push(&account(&mock_server.uri())).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unsubscribe_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let err = worker()
            .unsubscribe_push(&account(&mock_server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), 404);
        assert_eq!(err.error_description(), "Not Found");
    }

    #[tokio::test]
    async fn unsubscribe_connection_refused() {
        let err = worker()
            .unsubscribe_push(&account("http://127.0.0.1:1"))
            .await
            .unwrap_err();
        assert_ne!(err.error_code(), 0);
        assert!(!err.error_description().is_empty());
    }
}
