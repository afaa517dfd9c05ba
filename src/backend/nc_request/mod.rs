#![allow(non_snake_case)]

mod nc_account;
mod nc_push_error;
mod nc_req_data_push;
mod nc_req_worker;
mod nc_request_ocs_wrapper;
pub mod nc_requester;

pub use nc_account::*;
pub use nc_push_error::*;
pub use nc_req_data_push::*;
pub use nc_req_worker::{interpret_push_response, PUSH_ENDPOINT};
pub use nc_request_ocs_wrapper::*;
pub use nc_requester::{
    NCPushReply, NCRequest, NCRequestInterface, SubscribeReply, UnsubscribeReply,
};

#[cfg(test)]
pub use nc_requester::MockNCRequest;
