use tokio::{
    runtime::Handle,
    sync::{
        mpsc::{self, error::SendError, Sender},
        oneshot,
    },
};

use crate::config::Config;
use async_trait::async_trait;

use std::fmt::Debug;
use std::sync::Arc;

#[cfg(test)]
use mockall::{mock, predicate::*};

use super::{
    nc_req_worker::NCRequestWorker, NCAccount, NCPushDevice, NCPushError, NCReqDataPushDevice,
};

/// Outcome of one request, tagged with the account it was made for.
#[derive(Debug)]
pub struct NCPushReply<T> {
    pub account: String,
    pub result: Result<T, NCPushError>,
}

impl<T> NCPushReply<T> {
    #[must_use]
    pub fn new(account: &str, result: Result<T, NCPushError>) -> Self {
        NCPushReply {
            account: account.to_string(),
            result,
        }
    }

    /// `0` on success.
    #[must_use]
    pub fn error_code(&self) -> i32 {
        self.result.as_ref().map_or_else(NCPushError::error_code, |_| 0)
    }

    /// Empty on success.
    #[must_use]
    pub fn error_description(&self) -> String {
        self.result
            .as_ref()
            .map_or_else(NCPushError::error_description, |_| String::new())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl NCPushReply<NCReqDataPushDevice> {
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.result.as_ref().ok().map(|data| data.signature.as_str())
    }

    #[must_use]
    pub fn public_key(&self) -> Option<&str> {
        self.result.as_ref().ok().map(|data| data.publicKey.as_str())
    }
}

pub type SubscribeReply = NCPushReply<NCReqDataPushDevice>;
pub type UnsubscribeReply = NCPushReply<()>;

#[derive(Default)]
pub enum ApiRequests {
    #[default]
    None,
    SubscribePush(NCAccount, NCPushDevice, oneshot::Sender<SubscribeReply>),
    UnsubscribePush(NCAccount, oneshot::Sender<UnsubscribeReply>),
}

impl ApiRequests {
    /// Answer a request that never reached the worker.
    fn reject(self, why: NCPushError) {
        let delivered = match self {
            ApiRequests::SubscribePush(account, _, response) => response
                .send(NCPushReply::new(&account.account, Err(why)))
                .is_ok(),
            ApiRequests::UnsubscribePush(account, response) => response
                .send(NCPushReply::new(&account.account, Err(why)))
                .is_ok(),
            ApiRequests::None => true,
        };
        if !delivered {
            log::debug!("Receiver of rejected request is gone.");
        }
    }
}

#[async_trait]
pub trait NCRequestInterface: Debug + Send + Sync {
    async fn request_subscribe_push(
        &self,
        account: &NCAccount,
        device: &NCPushDevice,
    ) -> oneshot::Receiver<SubscribeReply>;
    async fn request_unsubscribe_push(
        &self,
        account: &NCAccount,
    ) -> oneshot::Receiver<UnsubscribeReply>;
}

#[derive(Debug, Clone)]
pub struct NCRequest {
    request_tx: Sender<ApiRequests>,
}

impl NCRequest {
    /// Spawn the request worker on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be created.
    pub fn new(config: &Config) -> Result<Self, NCPushError> {
        let (tx, mut rx) = mpsc::channel::<ApiRequests>(50);

        let worker = Arc::new(NCRequestWorker::new(config)?);
        log::debug!("Spawn Now");

        tokio::spawn(async move {
            while let Some(req) = rx.recv().await {
                // Each request runs on its own, a slow server must not hold up the others.
                let worker = Arc::clone(&worker);
                tokio::spawn(async move { handle_request(&worker, req).await });
            }
            log::debug!("Request channel closed, worker stops.");
        });
        log::debug!("Spawn Done");

        Ok(NCRequest { request_tx: tx })
    }

    async fn queue(&self, request: ApiRequests) {
        if let Err(SendError(request)) = self.request_tx.send(request).await {
            log::error!("Queuing push request failed, worker is gone.");
            request.reject(NCPushError::WorkerGone);
        }
    }

    /// Register `device` and hand the reply to `completion` as a task on `handle`.
    pub fn subscribe_push_on<F>(
        &self,
        handle: &Handle,
        account: NCAccount,
        device: NCPushDevice,
        completion: F,
    ) where
        F: FnOnce(SubscribeReply) + Send + 'static,
    {
        let requester = self.clone();
        handle.spawn(async move {
            let rx = requester.request_subscribe_push(&account, &device).await;
            completion(rx.await.unwrap_or_else(|_| {
                NCPushReply::new(&account.account, Err(NCPushError::WorkerGone))
            }));
        });
    }

    /// Remove the registration and hand the reply to `completion` as a task on `handle`.
    pub fn unsubscribe_push_on<F>(&self, handle: &Handle, account: NCAccount, completion: F)
    where
        F: FnOnce(UnsubscribeReply) + Send + 'static,
    {
        let requester = self.clone();
        handle.spawn(async move {
            let rx = requester.request_unsubscribe_push(&account).await;
            completion(rx.await.unwrap_or_else(|_| {
                NCPushReply::new(&account.account, Err(NCPushError::WorkerGone))
            }));
        });
    }
}

async fn handle_request(worker: &NCRequestWorker, req: ApiRequests) {
    let delivered = match req {
        ApiRequests::SubscribePush(account, device, response) => {
            let result = worker.subscribe_push(&account, &device).await;
            response
                .send(NCPushReply::new(&account.account, result))
                .is_ok()
        }
        ApiRequests::UnsubscribePush(account, response) => {
            let result = worker.unsubscribe_push(&account).await;
            response
                .send(NCPushReply::new(&account.account, result))
                .is_ok()
        }
        ApiRequests::None => {
            log::warn!("Unknown Request");
            true
        }
    };
    if !delivered {
        log::debug!("Caller dropped the receiver before the reply arrived.");
    }
}

#[async_trait]
impl NCRequestInterface for NCRequest {
    async fn request_subscribe_push(
        &self,
        account: &NCAccount,
        device: &NCPushDevice,
    ) -> oneshot::Receiver<SubscribeReply> {
        let (tx, rx) = oneshot::channel();
        self.queue(ApiRequests::SubscribePush(
            account.clone(),
            device.clone(),
            tx,
        ))
        .await;
        rx
    }

    async fn request_unsubscribe_push(
        &self,
        account: &NCAccount,
    ) -> oneshot::Receiver<UnsubscribeReply> {
        let (tx, rx) = oneshot::channel();
        self.queue(ApiRequests::UnsubscribePush(account.clone(), tx))
            .await;
        rx
    }
}

#[cfg(test)]
mock! {
    #[derive(Debug)]
    pub NCRequest {}     // Name of the mock struct, less the "Mock" prefix

    #[async_trait]
    impl NCRequestInterface for NCRequest {
        async fn request_subscribe_push(
            &self,
            account: &NCAccount,
            device: &NCPushDevice,
        ) -> oneshot::Receiver<SubscribeReply>;
        async fn request_unsubscribe_push(
            &self,
            account: &NCAccount,
        ) -> oneshot::Receiver<UnsubscribeReply>;
    }
}
