use crate::{
    backend::nc_request::{
        NCAccount, NCPushDevice, NCRequestInterface, SubscribeReply, UnsubscribeReply,
    },
    config::Config,
};

use super::nc_request::{NCPushError, NCPushReply};

/// Push registration of one device on one account.
#[derive(Debug)]
pub struct NCPush<Requester: NCRequestInterface + 'static> {
    account: NCAccount,
    device: NCPushDevice,
    requester: Requester,
}

impl<Requester: NCRequestInterface + 'static> NCPush<Requester> {
    #[must_use]
    pub fn new(requester: Requester, config: &Config) -> Self {
        NCPush {
            account: config.get_account(),
            device: config.get_push_device(),
            requester,
        }
    }

    #[must_use]
    pub fn with_device(mut self, device: NCPushDevice) -> Self {
        self.device = device;
        self
    }

    #[must_use]
    pub fn account(&self) -> &NCAccount {
        &self.account
    }

    #[must_use]
    pub fn device(&self) -> &NCPushDevice {
        &self.device
    }

    pub async fn subscribe(&self) -> SubscribeReply {
        let rx = self
            .requester
            .request_subscribe_push(&self.account, &self.device)
            .await;
        let reply = rx.await.unwrap_or_else(|_| self.lost_reply());
        match &reply.result {
            Ok(data) => log::info!(
                "Subscribed {} for push, server key has {} bytes",
                self.account.account,
                data.publicKey.len()
            ),
            Err(why) => log::warn!(
                "Subscribing {} failed with {}: {}",
                self.account.account,
                why.error_code(),
                why.error_description()
            ),
        }
        reply
    }

    pub async fn unsubscribe(&self) -> UnsubscribeReply {
        let rx = self.requester.request_unsubscribe_push(&self.account).await;
        let reply = rx.await.unwrap_or_else(|_| self.lost_reply());
        if reply.is_success() {
            log::info!("Unsubscribed {} from push", self.account.account);
        } else {
            log::warn!(
                "Unsubscribing {} failed with {}: {}",
                self.account.account,
                reply.error_code(),
                reply.error_description()
            );
        }
        reply
    }

    fn lost_reply<T>(&self) -> NCPushReply<T> {
        log::error!("Reply for {} got lost.", self.account.account);
        NCPushReply::new(&self.account.account, Err(NCPushError::WorkerGone))
    }
}
