//! Remote Clients Module
//!
//! Network-backed cache implementations and their pub/sub surface.

mod redis;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;

pub use self::redis::RedisCache;

/// A message delivered on a subscribed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubSubMessage {
    pub channel: String,
    pub payload: String,
}

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes `message` on `channel`.
    async fn publish(&self, channel: &str, message: &str) -> Result<()>;
}

#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Subscribes to `channel` once the server confirms the subscription.
    ///
    /// The receiver closes when the connection drops.
    async fn subscribe(&self, channel: &str) -> Result<mpsc::Receiver<PubSubMessage>>;
}

/// Both halves of channel messaging.
pub trait PubSub: Publisher + Subscriber {}

impl<T: Publisher + Subscriber> PubSub for T {}
