#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
//! # NC Push Notification Client
//!
//! ncpush-rs registers a device for push notifications at a Nextcloud server and removes
//! that registration again. It talks to the [Nextcloud Notifications API] of the server.
//!
//! ## Usage
//!
//! ```no_run
//! use ncpush::backend::nc_request::{NCAccount, NCPushDevice, NCRequest, NCRequestInterface};
//! use ncpush::config::Config;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let requester = NCRequest::new(&Config::default())?;
//! let account = NCAccount::new("https://cloud.example.com", "me@cloud", "me", "app-password");
//! let device = NCPushDevice::new("device-id", "-----BEGIN PUBLIC KEY-----...", "rust");
//!
//! let reply = requester.request_subscribe_push(&account, &device).await.await?;
//! println!("{} {} {:?}", reply.error_code(), reply.error_description(), reply.signature());
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Considerations
//!
//! - [`backend::nc_request`] holds the typed OCS envelope, the error codes and the
//!   [`backend::nc_request::NCRequest`] which runs every request on a worker task and answers
//!   it exactly once through a oneshot channel.
//! - [`backend::nc_push::NCPush`] is the registration of the configured device.
//! - [`config`] reads the `config.toml` and sets up logging.
//!
//! Every failure ends up as an `(error code, error description)` pair, see
//! [`backend::nc_request::NCPushError`]. Code `0` with an empty description is success.
//!
//! ### Testing and Mocking
//! The requester is hidden behind [`backend::nc_request::NCRequestInterface`] so the
//! [`mockall`] crate can stand in for it. HTTP level behaviour is tested against a
//! [`wiremock`] server.
//!
//! [Nextcloud Notifications API]: https://github.com/nextcloud/notifications/blob/master/docs/push-v2.md
//! [`mockall`]: https://crates.io/crates/mockall
//! [`wiremock`]: https://crates.io/crates/wiremock

/// Push API Communication with the NC Server
#[allow(missing_docs)]
pub mod backend;
/// Config Module
#[allow(missing_docs)]
pub mod config;
