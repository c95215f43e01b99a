//! Redis Cache Module
//!
//! Thin pass-through to a redis server. Values travel as JSON text, TTLs map
//! to `PX` expiry, and the multiplexed connection is opened on first use.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{check_value_size, Cache, CacheValue};
use crate::clients::{PubSubMessage, Publisher, Subscriber};
use crate::config::RedisConfig;
use crate::error::{CacheError, Result};

/// Messages buffered per subscription before the reader applies backpressure
const SUBSCRIPTION_BUFFER: usize = 64;

// == Redis Cache ==
/// Cache backed by a redis server.
pub struct RedisCache {
    client: Client,
    address: String,
    conn: Mutex<Option<MultiplexedConnection>>,
    closed: AtomicBool,
    /// Flipped to `true` by `close`; every subscription task watches it
    shutdown: watch::Sender<bool>,
}

impl RedisCache {
    // == Constructor ==
    /// Validates the configuration and prepares a client without dialing.
    ///
    /// Fails fast with `MissingRedisHost`/`MissingRedisPassword` when either
    /// is empty, and with `InvalidConfig` for a port that is not a number.
    pub fn new(config: RedisConfig) -> Result<Self> {
        let host = config.host.trim();
        if host.is_empty() {
            return Err(CacheError::MissingRedisHost);
        }
        if config.password.is_empty() {
            return Err(CacheError::MissingRedisPassword);
        }

        let port: u16 = config
            .effective_port()
            .parse()
            .map_err(|_| CacheError::InvalidConfig(format!("invalid redis port: {}", config.port)))?;

        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(host.to_string(), port),
            redis: RedisConnectionInfo {
                password: Some(config.password.clone()),
                ..Default::default()
            },
        };
        let client = Client::open(info)?;

        Ok(Self {
            client,
            address: format!("{}:{}", host, port),
            conn: Mutex::new(None),
            closed: AtomicBool::new(false),
            shutdown: watch::channel(false).0,
        })
    }

    /// `host:port` this client dials.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        let mut slot = self.conn.lock().await;
        if self.is_closed() {
            return Err(CacheError::Closed);
        }
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self.client.get_multiplexed_async_connection().await?;
        debug!(address = %self.address, "redis connection established");
        *slot = Some(conn.clone());
        Ok(conn)
    }
}

#[async_trait]
impl<V> Cache<V> for RedisCache
where
    V: CacheValue,
{
    async fn get(&self, key: &str) -> Result<V> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(key).await?;
        let raw = raw.ok_or(CacheError::NotFound)?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn set(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        let payload = serde_json::to_string(&value)?;
        check_payload_size(payload.len())?;

        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(payload);
        if let Some(millis) = expiry_millis(ttl) {
            cmd.arg("PX").arg(millis);
        }
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let removed: i64 = conn.del(key).await?;
        if removed == 0 {
            return Err(CacheError::NotFound);
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut slot = self.conn.lock().await;
        self.closed.store(true, Ordering::Release);
        self.shutdown.send_replace(true);
        if slot.take().is_some() {
            info!(address = %self.address, "closing redis connection");
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl Publisher for RedisCache {
    async fn publish(&self, channel: &str, message: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let receivers: i64 = conn.publish(channel, message).await?;
        debug!(channel, receivers, "redis publish");
        Ok(())
    }
}

#[async_trait]
impl Subscriber for RedisCache {
    async fn subscribe(&self, channel: &str) -> Result<mpsc::Receiver<PubSubMessage>> {
        let shutdown = self.shutdown.subscribe();
        if self.is_closed() {
            return Err(CacheError::Closed);
        }

        let mut pubsub = self.client.get_async_pubsub().await.map_err(|e| {
            warn!(channel, error = %e, "redis pubsub connection failed");
            CacheError::Subscribe(channel.to_string())
        })?;
        pubsub.subscribe(channel).await.map_err(|e| {
            warn!(channel, error = %e, "redis subscribe failed");
            CacheError::Subscribe(channel.to_string())
        })?;
        info!(channel, "redis subscription confirmed");

        let messages = pubsub.into_on_message().filter_map(|msg| async move {
            match msg.get_payload::<String>() {
                Ok(payload) => Some(PubSubMessage {
                    channel: msg.get_channel_name().to_string(),
                    payload,
                }),
                Err(e) => {
                    warn!(error = %e, "dropping undecodable pubsub payload");
                    None
                }
            }
        });

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        spawn_forwarder(messages, tx, shutdown);
        Ok(rx)
    }
}

/// Moves messages into `tx` until the stream ends, the receiver is dropped,
/// or `shutdown` fires. Dropping the owning cache also counts as shutdown.
fn spawn_forwarder<S>(
    messages: S,
    tx: mpsc::Sender<PubSubMessage>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    S: Stream<Item = PubSubMessage> + Send + 'static,
{
    tokio::spawn(async move {
        let mut messages = Box::pin(messages);
        if *shutdown.borrow_and_update() {
            return;
        }

        loop {
            let next = tokio::select! {
                msg = messages.next() => msg,
                _ = tx.closed() => None,
                _ = shutdown.changed() => None,
            };
            let Some(message) = next else {
                break;
            };

            let delivered = tokio::select! {
                sent = tx.send(message) => sent.is_ok(),
                _ = shutdown.changed() => false,
            };
            if !delivered {
                break;
            }
        }
        debug!("redis subscription ended");
    })
}

fn check_payload_size(size: usize) -> Result<()> {
    check_value_size(size, 0)
}

/// `PX` argument for a TTL; `None` means no expiry.
fn expiry_millis(ttl: Duration) -> Option<u64> {
    if ttl.is_zero() {
        return None;
    }
    // Sub-millisecond TTLs round up so they still expire.
    Some(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1))
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("address", &self.address)
            .field("closed", &self.is_closed())
            .finish()
    }
}
