use std::{sync::Arc, time::Duration};

use anyhow::{Error, Result, anyhow};
use chrono::{Local, NaiveDate};
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    clients::{
        adapter::AdapterRegistry,
        config_store::ConfigStore,
        history::DeliveryHistory,
        queue::MessageQueue,
        template::{TemplateRenderer, Variables, render},
    },
    config::Config,
    dispatcher::Dispatcher,
    models::{
        channel::ConfigStatus,
        message::{Channel, NotificationKind, NotificationRequest},
        result::{DispatchResult, HistoryRecord},
        stats::QueueStats,
    },
};

/// Entry point for everything that wants to notify a guardian.
pub struct NotificationService {
    queue: Arc<MessageQueue>,
    config_store: Arc<dyn ConfigStore>,
    history: Arc<DeliveryHistory>,
    dispatcher: Arc<Dispatcher>,
    templates: TemplateRenderer,
}

impl NotificationService {
    pub fn new(
        config: &Config,
        config_store: Arc<dyn ConfigStore>,
        adapters: AdapterRegistry,
    ) -> Self {
        let queue = Arc::new(MessageQueue::new());
        let history = Arc::new(DeliveryHistory::new(config.history_capacity));

        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&queue),
            Arc::clone(&config_store),
            adapters,
            Arc::clone(&history),
            config.retry_config(),
            Duration::from_millis(config.dispatch_interval_ms),
        ));

        Self {
            queue,
            config_store,
            history,
            dispatcher,
            templates: TemplateRenderer::default(),
        }
    }

    pub fn with_templates(mut self, templates: TemplateRenderer) -> Self {
        self.templates = templates;
        self
    }

    pub fn start(&self) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(&self.dispatcher).run())
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn queue_notification(&self, request: NotificationRequest) -> Uuid {
        let id = request.id;
        let pending = self.queue.enqueue(request);
        info!(request_id = %id, pending, "Notification added to queue");
        id
    }

    /// Delivers right away instead of waiting for the loop. No retries.
    pub async fn send_notification(&self, request: NotificationRequest) -> DispatchResult {
        self.dispatcher.send_once(request).await
    }

    /// Renders the attendance template for `kind` and queues one request per
    /// requested channel that the template targets and that is enabled.
    pub fn send_attendance_notification(
        &self,
        student_name: &str,
        recipient: &str,
        kind: NotificationKind,
        time: &str,
        channels: &[Channel],
    ) -> Result<Vec<Uuid>, Error> {
        let date = Local::now().date_naive();
        self.send_attendance_notification_on(student_name, recipient, kind, time, date, channels)
    }

    pub fn send_attendance_notification_on(
        &self,
        student_name: &str,
        recipient: &str,
        kind: NotificationKind,
        time: &str,
        date: NaiveDate,
        channels: &[Channel],
    ) -> Result<Vec<Uuid>, Error> {
        let variables: Variables = [
            ("studentName".to_string(), json!(student_name)),
            ("time".to_string(), json!(time)),
            ("date".to_string(), json!(date.format("%Y-%m-%d").to_string())),
        ]
        .into_iter()
        .collect();

        let template = self
            .templates
            .template_for(kind)
            .ok_or_else(|| anyhow!("No active template for {} notifications", kind))?;
        let message = render(&template.body, &variables);

        let enabled: Vec<Channel> = channels
            .iter()
            .copied()
            .filter(|channel| template.channels.contains(channel))
            .filter(|channel| self.config_store.channel_config(*channel).enabled)
            .collect();

        if enabled.is_empty() {
            warn!(student = student_name, %kind, "No notification channel enabled");
            return Err(anyhow!("No notification channel is enabled"));
        }

        let ids = enabled
            .into_iter()
            .map(|channel| {
                let request = NotificationRequest::new(
                    channel,
                    recipient,
                    message.clone(),
                    student_name,
                    kind,
                )
                .with_metadata("time", json!(time))
                .with_metadata("automated", json!(true))
                .with_metadata("source", json!("attendance_system"));

                self.queue_notification(request)
            })
            .collect();

        info!(student = student_name, %kind, "Attendance notification scheduled");

        Ok(ids)
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.dispatcher.stats()
    }

    pub fn config_status(&self) -> ConfigStatus {
        self.config_store.snapshot().status()
    }

    pub fn recent_history(&self, limit: usize) -> Vec<HistoryRecord> {
        self.history.recent(limit)
    }

    pub fn history(&self) -> &Arc<DeliveryHistory> {
        &self.history
    }

    pub fn clear_queue(&self) -> usize {
        let cleared = self.queue.clear();
        info!(cleared, "Notification queue cleared");
        cleared
    }
}
