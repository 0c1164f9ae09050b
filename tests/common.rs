use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use notify_service::{
    clients::{
        adapter::{AdapterRegistry, ChannelAdapter, SendError},
        config_store::{ConfigStore, InMemoryConfigStore},
        history::DeliveryHistory,
        queue::MessageQueue,
    },
    dispatcher::{Dispatcher, TickOutcome},
    models::{
        channel::{ChannelConfig, ChannelSettings},
        message::{Channel, NotificationKind, NotificationRequest},
        result::DispatchResult,
        retry::RetryConfig,
    },
};
use parking_lot::Mutex;
use tokio::time::{sleep, timeout};

pub const TEST_CREDENTIAL: &str = "test-credential-123";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Deliver,
    Transient,
    Reject,
    Panic,
}

/// Adapter that follows a script, then falls back to a fixed behavior.
pub struct ScriptedAdapter {
    channel: Channel,
    script: Mutex<VecDeque<Behavior>>,
    fallback: Behavior,
    delay: Duration,
    calls: AtomicU32,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
    recipients: Mutex<Vec<String>>,
}

impl ScriptedAdapter {
    pub fn new(channel: Channel, fallback: Behavior) -> Self {
        Self {
            channel,
            script: Mutex::new(VecDeque::new()),
            fallback,
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
            in_flight: AtomicU32::new(0),
            max_in_flight: AtomicU32::new(0),
            recipients: Mutex::new(Vec::new()),
        }
    }

    pub fn with_script(self, script: Vec<Behavior>) -> Self {
        *self.script.lock() = script.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn recipients(&self) -> Vec<String> {
        self.recipients.lock().clone()
    }
}

#[async_trait]
impl ChannelAdapter for ScriptedAdapter {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(
        &self,
        recipient: &str,
        _message: &str,
        _config: &ChannelConfig,
    ) -> Result<String, SendError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.recipients.lock().push(recipient.to_string());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let behavior = self.script.lock().pop_front().unwrap_or(self.fallback);
        match behavior {
            Behavior::Deliver => Ok(format!("{}_{}", self.channel, call)),
            Behavior::Transient => Err(SendError::Transient("service unavailable".into())),
            Behavior::Reject => Err(SendError::Rejected("recipient blocked".into())),
            Behavior::Panic => panic!("scripted adapter fault"),
        }
    }
}

pub fn enabled_settings() -> ChannelSettings {
    ChannelSettings::new()
        .with_channel(
            Channel::WhatsApp,
            ChannelConfig::new(true, "http://localhost/whatsapp", TEST_CREDENTIAL),
        )
        .with_channel(
            Channel::Telegram,
            ChannelConfig::new(true, "http://localhost/bot", TEST_CREDENTIAL),
        )
}

pub struct Harness {
    pub queue: Arc<MessageQueue>,
    pub history: Arc<DeliveryHistory>,
    pub store: Arc<InMemoryConfigStore>,
    pub adapter: Arc<ScriptedAdapter>,
    pub dispatcher: Arc<Dispatcher>,
}

impl Harness {
    pub fn new(adapter: ScriptedAdapter, retry_config: RetryConfig) -> Self {
        Self::with_settings(adapter, retry_config, enabled_settings())
    }

    pub fn with_settings(
        adapter: ScriptedAdapter,
        retry_config: RetryConfig,
        settings: ChannelSettings,
    ) -> Self {
        let queue = Arc::new(MessageQueue::new());
        let history = Arc::new(DeliveryHistory::new(100));
        let store = Arc::new(InMemoryConfigStore::new(settings));
        let adapter = Arc::new(adapter);

        let config_store: Arc<dyn ConfigStore> = store.clone();
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&queue),
            config_store,
            AdapterRegistry::new().register(adapter.clone()),
            Arc::clone(&history),
            retry_config,
            Duration::from_millis(10),
        ));

        Self {
            queue,
            history,
            store,
            adapter,
            dispatcher,
        }
    }

    /// Ticks until nothing is queued, in flight or waiting on a retry timer.
    pub async fn drain(&self) -> Result<Vec<DispatchResult>> {
        let dispatcher = Arc::clone(&self.dispatcher);

        timeout(Duration::from_secs(5), async move {
            let mut results = Vec::new();
            loop {
                match dispatcher.tick().await {
                    TickOutcome::Dispatched(result) => results.push(result),
                    TickOutcome::Busy => sleep(Duration::from_millis(1)).await,
                    TickOutcome::Idle if dispatcher.is_quiescent() => return results,
                    TickOutcome::Idle => sleep(Duration::from_millis(5)).await,
                }
            }
        })
        .await
        .map_err(|_| anyhow!("dispatcher did not reach quiescence"))
    }
}

pub fn request(channel: Channel, recipient: &str) -> NotificationRequest {
    NotificationRequest::new(
        channel,
        recipient,
        format!("Hello {}", recipient),
        "Ana Perez",
        NotificationKind::Entry,
    )
}
