//! Backend for the Push Notification API of a NC Server

/// NC OCS API Wrapper
pub mod nc_request;
/// Push registration of the configured device
pub mod nc_push;
