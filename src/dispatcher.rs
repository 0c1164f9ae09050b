use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono::Utc;
use futures_util::FutureExt;
use parking_lot::Mutex;
use tokio::{
    sync::Mutex as AsyncMutex,
    task::JoinError,
    time::{MissedTickBehavior, interval, sleep},
};
use tracing::{debug, error, info, warn};

use crate::{
    clients::{
        adapter::{AdapterRegistry, SendError},
        config_store::ConfigStore,
        history::DeliveryHistory,
        queue::MessageQueue,
    },
    models::{
        message::NotificationRequest,
        result::{DispatchResult, HistoryRecord},
        retry::RetryConfig,
        stats::QueueStats,
        status::{DispatchState, FailureReason},
    },
    utils::retry_delay,
};

/// What a single wake of the dispatcher did.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// Nothing was queued.
    Idle,
    /// Another dispatch was still in flight, so this wake was skipped.
    Busy,
    Dispatched(DispatchResult),
}

#[derive(Debug, Default)]
struct DispatchMetrics {
    delivered: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
}

/// Single worker that drains the queue one request per wake.
///
/// At most one adapter call is in flight at any time. Transient failures are
/// put back at the tail of the queue after the retry delay until
/// `max_attempts` is reached; every other failure is terminal.
///
/// Each claim, send and settle cycle runs in its own task that holds the
/// in-flight guard and owns the claimed request. Callers that stop waiting
/// on `tick` or `send_once` do not cut the cycle short.
pub struct Dispatcher {
    queue: Arc<MessageQueue>,
    config_store: Arc<dyn ConfigStore>,
    adapters: AdapterRegistry,
    history: Arc<DeliveryHistory>,
    retry_config: RetryConfig,
    wake_interval: Duration,
    in_flight: Arc<AsyncMutex<()>>,
    processing: AtomicBool,
    state: Mutex<DispatchState>,
    scheduled_retries: Arc<AtomicUsize>,
    metrics: DispatchMetrics,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<MessageQueue>,
        config_store: Arc<dyn ConfigStore>,
        adapters: AdapterRegistry,
        history: Arc<DeliveryHistory>,
        retry_config: RetryConfig,
        wake_interval: Duration,
    ) -> Self {
        info!(
            max_attempts = retry_config.max_attempts,
            initial_delay_ms = retry_config.initial_delay_ms,
            backoff_multiplier = retry_config.backoff_multiplier,
            wake_interval_ms = wake_interval.as_millis() as u64,
            channels = ?adapters.channels(),
            "Dispatcher initialized"
        );

        Self {
            queue,
            config_store,
            adapters,
            history,
            retry_config,
            wake_interval,
            in_flight: Arc::new(AsyncMutex::new(())),
            processing: AtomicBool::new(false),
            state: Mutex::new(DispatchState::Idle),
            scheduled_retries: Arc::new(AtomicUsize::new(0)),
            metrics: DispatchMetrics::default(),
        }
    }

    /// Wakes every `wake_interval` and dispatches at most one request per wake.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = interval(self.wake_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Dispatch loop started");

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    pub async fn tick(self: &Arc<Self>) -> TickOutcome {
        let Ok(guard) = Arc::clone(&self.in_flight).try_lock_owned() else {
            debug!("Dispatch already in flight, skipping wake");
            return TickOutcome::Busy;
        };

        let dispatcher = Arc::clone(self);
        let cycle = tokio::spawn(async move {
            let _guard = guard;

            dispatcher.processing.store(true, Ordering::SeqCst);
            let outcome = match dispatcher.queue.dequeue_next() {
                Some(request) => {
                    let result = dispatcher.attempt(&request).await;
                    TickOutcome::Dispatched(dispatcher.settle(request, result))
                }
                None => TickOutcome::Idle,
            };
            dispatcher.processing.store(false, Ordering::SeqCst);

            outcome
        });

        match cycle.await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                self.reset_after_fault(&join_error);
                TickOutcome::Idle
            }
        }
    }

    /// One attempt outside the queue. Waits for any in-flight dispatch,
    /// never retries, and records the outcome as terminal.
    pub async fn send_once(self: &Arc<Self>, request: NotificationRequest) -> DispatchResult {
        let guard = Arc::clone(&self.in_flight).lock_owned().await;

        let (request_id, channel, attempt) =
            (request.id, request.channel, request.attempt_count + 1);

        let dispatcher = Arc::clone(self);
        let cycle = tokio::spawn(async move {
            let _guard = guard;
            let mut request = request;

            dispatcher.processing.store(true, Ordering::SeqCst);
            let result = dispatcher.attempt(&request).await;
            dispatcher.processing.store(false, Ordering::SeqCst);

            if result.success {
                dispatcher.metrics.delivered.fetch_add(1, Ordering::Relaxed);
            } else {
                request.attempt_count += 1;
                dispatcher.metrics.failed.fetch_add(1, Ordering::Relaxed);
            }

            dispatcher.history.record(HistoryRecord {
                request,
                result: result.clone(),
            });

            result
        });

        match cycle.await {
            Ok(result) => result,
            Err(join_error) => {
                self.reset_after_fault(&join_error);
                DispatchResult {
                    request_id,
                    channel,
                    attempt,
                    success: false,
                    channel_message_id: None,
                    error_reason: Some(FailureReason::Transient),
                    error: Some(format!("dispatch fault: {}", join_error)),
                    timestamp: Utc::now(),
                }
            }
        }
    }

    fn reset_after_fault(&self, join_error: &JoinError) {
        error!(error = %join_error, "Dispatch cycle aborted");
        self.processing.store(false, Ordering::SeqCst);
        self.set_state(DispatchState::Idle);
    }

    async fn attempt(&self, request: &NotificationRequest) -> DispatchResult {
        let attempt = request.attempt_count + 1;
        self.set_state(DispatchState::Claiming);

        let config = self.config_store.channel_config(request.channel);

        if !config.enabled {
            self.set_state(DispatchState::Idle);
            warn!(request_id = %request.id, channel = %request.channel, "Channel is disabled");
            return DispatchResult::failed(
                request,
                attempt,
                FailureReason::ChannelDisabled,
                format!("{} is disabled", request.channel),
            );
        }

        if !config.is_configured() {
            self.set_state(DispatchState::Idle);
            warn!(request_id = %request.id, channel = %request.channel, "Channel credential missing or invalid");
            return DispatchResult::failed(
                request,
                attempt,
                FailureReason::NotConfigured,
                format!("{} credential is missing or invalid", request.channel),
            );
        }

        let Some(adapter) = self.adapters.get(request.channel) else {
            self.set_state(DispatchState::Idle);
            warn!(request_id = %request.id, channel = %request.channel, "No adapter registered for channel");
            return DispatchResult::failed(
                request,
                attempt,
                FailureReason::NotConfigured,
                format!("no adapter registered for {}", request.channel),
            );
        };

        self.set_state(DispatchState::Sending);
        info!(
            request_id = %request.id,
            channel = %request.channel,
            kind = %request.kind,
            subject = %request.subject_name,
            attempt,
            "Sending notification"
        );

        let outcome = AssertUnwindSafe(adapter.send(&request.recipient, &request.message, &config))
            .catch_unwind()
            .await;

        self.set_state(DispatchState::Idle);

        match outcome {
            Ok(Ok(message_id)) => DispatchResult::delivered(request, attempt, message_id),
            Ok(Err(SendError::Rejected(reason))) => {
                warn!(request_id = %request.id, channel = %request.channel, error = %reason, "Channel rejected notification");
                DispatchResult::failed(request, attempt, FailureReason::Rejected, reason)
            }
            Ok(Err(SendError::Transient(reason))) => {
                warn!(request_id = %request.id, channel = %request.channel, attempt, error = %reason, "Transient delivery failure");
                DispatchResult::failed(request, attempt, FailureReason::Transient, reason)
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(
                    request_id = %request.id,
                    channel = %request.channel,
                    error = %reason,
                    "Channel adapter crashed, treating as transient failure"
                );
                DispatchResult::failed(
                    request,
                    attempt,
                    FailureReason::Transient,
                    format!("adapter fault: {}", reason),
                )
            }
        }
    }

    /// Hands the request to its next owner: back to the queue through a
    /// retry, or into the history. Returns the result reported for this wake.
    fn settle(&self, mut request: NotificationRequest, result: DispatchResult) -> DispatchResult {
        if result.success {
            self.metrics.delivered.fetch_add(1, Ordering::Relaxed);
            info!(
                request_id = %request.id,
                channel = %request.channel,
                message_id = result.channel_message_id.as_deref().unwrap_or_default(),
                "Notification delivered"
            );
            self.history.record(HistoryRecord {
                request,
                result: result.clone(),
            });
            return result;
        }

        request.attempt_count += 1;

        let retryable = result
            .error_reason
            .is_some_and(|reason| reason.is_retryable());

        if retryable && request.attempt_count < self.retry_config.max_attempts {
            self.metrics.retried.fetch_add(1, Ordering::Relaxed);
            let delay = retry_delay(&self.retry_config, request.attempt_count);
            self.schedule_retry(request, delay);
            return result;
        }

        let result = if retryable {
            warn!(
                request_id = %request.id,
                channel = %request.channel,
                attempts = request.attempt_count,
                "Retries exhausted, giving up"
            );
            result.into_exhausted()
        } else {
            result
        };

        self.metrics.failed.fetch_add(1, Ordering::Relaxed);
        self.history.record(HistoryRecord {
            request,
            result: result.clone(),
        });

        result
    }

    fn schedule_retry(&self, request: NotificationRequest, delay: Duration) {
        info!(
            request_id = %request.id,
            channel = %request.channel,
            attempt_count = request.attempt_count,
            delay_ms = delay.as_millis() as u64,
            "Scheduling retry"
        );

        if delay.is_zero() {
            self.queue.enqueue(request);
            return;
        }

        let queue = Arc::clone(&self.queue);
        let scheduled = Arc::clone(&self.scheduled_retries);
        scheduled.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(async move {
            sleep(delay).await;
            queue.enqueue(request);
            scheduled.fetch_sub(1, Ordering::SeqCst);
        });
    }

    fn set_state(&self, state: DispatchState) {
        *self.state.lock() = state;
    }

    pub fn state(&self) -> DispatchState {
        *self.state.lock()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    pub fn scheduled_retries(&self) -> usize {
        self.scheduled_retries.load(Ordering::SeqCst)
    }

    /// Nothing queued, nothing in flight, no retry waiting on its timer.
    pub fn is_quiescent(&self) -> bool {
        self.queue.is_empty() && self.scheduled_retries() == 0 && !self.is_processing()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            pending: self.queue.len(),
            processing: self.is_processing(),
            state: self.state(),
            scheduled_retries: self.scheduled_retries(),
            channels: self.queue.pending_count_by_channel(),
            delivered: self.metrics.delivered.load(Ordering::Relaxed),
            failed: self.metrics.failed.load(Ordering::Relaxed),
            retried: self.metrics.retried.load(Ordering::Relaxed),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "adapter panicked".to_string())
}
