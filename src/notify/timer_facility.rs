use std::{
    collections::HashMap,
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    sync::{RwLock, watch},
    task::{self, JoinHandle},
    time,
};
use tokio_util::sync::CancellationToken;

use super::{
    AuthorizationOptions, NotificationChannel, NotificationError, NotificationFacility,
    NotificationRequest,
};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);
const CANCEL_TIMEOUT: Duration = Duration::from_secs(5);

struct PendingRequest {
    task: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl PendingRequest {
    async fn cancel(self) {
        self.cancellation_token.cancel();
        let _ = time::timeout(CANCEL_TIMEOUT, self.task).await;
    }
}

struct CleanupTask(watch::Sender<()>);

type RequestStore = RwLock<HashMap<String, PendingRequest>>;

/// Timer-backed notification facility: every pending registration is a tokio
/// task sleeping until its fire time, delivering through the configured
/// channel. One-shot tasks that have fired stay in the store until the
/// periodic cleanup pass reaps them.
pub struct TimerNotificationFacility {
    channel: Arc<dyn NotificationChannel>,
    requests: Arc<RequestStore>,
    cleanup_task: CleanupTask,
}

impl TimerNotificationFacility {
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        let requests = Arc::new(RwLock::new(HashMap::new()));
        let cleanup_task = Self::spawn_cleanup_task(Arc::clone(&requests));

        Self {
            channel,
            requests,
            cleanup_task,
        }
    }

    /// Number of registrations that are still waiting to fire.
    pub async fn pending_count(&self) -> usize {
        self.requests
            .read()
            .await
            .values()
            .filter(|pending| !pending.task.is_finished())
            .count()
    }

    fn spawn_request_task(&self, request: NotificationRequest) -> PendingRequest {
        let cancellation_token = CancellationToken::new();
        let task_cancellation_token = cancellation_token.child_token();
        let channel = Arc::clone(&self.channel);

        let task = task::spawn(async move {
            run_request(task_cancellation_token, request, channel).await;
        });

        PendingRequest {
            task,
            cancellation_token,
        }
    }

    fn spawn_cleanup_task(requests: Arc<RequestStore>) -> CleanupTask {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(());
        task::spawn(async move {
            loop {
                tokio::select! {
                    _ = time::sleep(CLEANUP_INTERVAL) => {
                        Self::clean_finished_requests(&requests).await;
                    }
                    _ = shutdown_rx.changed() => {
                        log::info!("Notification cleanup task shutting down");
                        break;
                    }
                };
            }
        });

        CleanupTask(shutdown_tx)
    }

    async fn clean_finished_requests(requests: &RequestStore) {
        let mut requests = requests.write().await;
        let before = requests.len();
        requests.retain(|_, pending| !pending.task.is_finished());
        let after = requests.len();

        if before != after {
            log::info!("Cleaned up {} fired notification request(s)", before - after);
        }
    }
}

impl Drop for TimerNotificationFacility {
    fn drop(&mut self) {
        let _ = self.cleanup_task.0.send(());
    }
}

#[async_trait]
impl NotificationFacility for TimerNotificationFacility {
    async fn request_authorization(
        &self,
        options: AuthorizationOptions,
    ) -> Result<bool, NotificationError> {
        Ok(self.channel.request_authorization(options).await?)
    }

    async fn add_request(&self, request: NotificationRequest) -> Result<(), NotificationError> {
        if request.repeats && request.delay.is_zero() {
            return Err(NotificationError::ZeroInterval);
        }

        let identifier = request.identifier.clone();
        log::info!(
            "[REGISTER] Notification request with {:?} delay. [identifier = {}, repeats = {}]",
            request.delay,
            identifier,
            request.repeats
        );

        let mut requests = self.requests.write().await;
        if let Some(previous) = requests.remove(&identifier) {
            log::info!("[REGISTER] Replacing prior request. [identifier = {identifier}]");
            previous.cancel().await;
        }
        requests.insert(identifier, self.spawn_request_task(request));

        Ok(())
    }

    async fn remove_all_pending(&self) {
        let mut requests = self.requests.write().await;
        if requests.is_empty() {
            return;
        }

        log::info!("Removing {} pending notification request(s)", requests.len());
        for (_, pending) in requests.drain() {
            pending.cancel().await;
        }
    }
}

async fn run_request(
    cancellation_token: CancellationToken,
    request: NotificationRequest,
    channel: Arc<dyn NotificationChannel>,
) {
    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                log::debug!(
                    "Notification request was cancelled. [identifier = {}]",
                    request.identifier
                );
                break;
            }
            _ = time::sleep(request.delay) => {
                if let Err(error) = channel.deliver(&request.content).await {
                    log::error!(
                        "Failed to deliver notification: {error:#}. [identifier = {}]",
                        request.identifier
                    );
                }

                if !request.repeats {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::notify::NotificationContent;

    type DeliveredContents = Arc<Mutex<Vec<NotificationContent>>>;

    struct RecordingChannel {
        delivered: DeliveredContents,
        granted: bool,
    }

    #[async_trait]
    impl NotificationChannel for RecordingChannel {
        async fn request_authorization(
            &self,
            _options: AuthorizationOptions,
        ) -> anyhow::Result<bool> {
            Ok(self.granted)
        }

        async fn deliver(&self, content: &NotificationContent) -> anyhow::Result<()> {
            self.delivered.lock().unwrap().push(content.clone());
            Ok(())
        }
    }

    struct TestContext {
        delivered: DeliveredContents,
        facility: TimerNotificationFacility,
    }

    impl TestContext {
        fn new() -> Self {
            Self::with_granted(true)
        }

        fn with_granted(granted: bool) -> Self {
            let delivered = Arc::new(Mutex::new(Vec::new()));
            let channel = RecordingChannel {
                delivered: Arc::clone(&delivered),
                granted,
            };
            let facility = TimerNotificationFacility::new(Arc::new(channel));

            Self {
                delivered,
                facility,
            }
        }

        fn delivered_count(&self) -> usize {
            self.delivered.lock().unwrap().len()
        }
    }

    fn request(delay_seconds: u64, repeats: bool) -> NotificationRequest {
        NotificationRequest {
            identifier: "test-request".to_owned(),
            content: NotificationContent {
                title: "Title".to_owned(),
                body: "Body".to_owned(),
                sound: false,
            },
            delay: Duration::from_secs(delay_seconds),
            repeats,
        }
    }

    async fn wait(seconds: u64) {
        time::sleep(Duration::from_secs(seconds)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_configured_delay() {
        let ctx = TestContext::new();

        ctx.facility.add_request(request(60, false)).await.unwrap();
        assert_eq!(ctx.facility.pending_count().await, 1);

        wait(61).await;

        assert_eq!(ctx.delivered_count(), 1);
        assert_eq!(ctx.facility.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn repeats_at_configured_cadence() {
        let ctx = TestContext::new();

        ctx.facility.add_request(request(60, true)).await.unwrap();

        wait(181).await;

        assert_eq!(ctx.delivered_count(), 3);
        assert_eq!(ctx.facility.pending_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_a_request_cancels_the_prior_cadence() {
        let ctx = TestContext::new();

        ctx.facility.add_request(request(60, true)).await.unwrap();
        wait(30).await;
        ctx.facility.add_request(request(100, true)).await.unwrap();

        wait(99).await;
        assert_eq!(ctx.delivered_count(), 0);
        assert_eq!(ctx.facility.pending_count().await, 1);

        wait(2).await;
        assert_eq!(ctx.delivered_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn remove_all_pending_silences_everything() {
        let ctx = TestContext::new();

        ctx.facility.add_request(request(60, true)).await.unwrap();
        ctx.facility.remove_all_pending().await;

        wait(121).await;

        assert_eq!(ctx.delivered_count(), 0);
        assert_eq!(ctx.facility.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_repeating_request_is_rejected() {
        let ctx = TestContext::new();

        let result = ctx.facility.add_request(request(0, true)).await;

        assert!(matches!(result, Err(NotificationError::ZeroInterval)));
        assert_eq!(ctx.facility.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_one_shot_fires_immediately() {
        let ctx = TestContext::new();

        ctx.facility.add_request(request(0, false)).await.unwrap();

        wait(1).await;

        assert_eq!(ctx.delivered_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn authorization_is_delegated_to_the_channel() {
        let ctx = TestContext::with_granted(false);

        let granted = ctx
            .facility
            .request_authorization(AuthorizationOptions::all())
            .await
            .unwrap();

        assert!(!granted);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_reaps_fired_one_shot_requests() {
        let ctx = TestContext::new();

        ctx.facility.add_request(request(1, false)).await.unwrap();
        wait(2).await;

        assert_eq!(ctx.delivered_count(), 1);
        assert_eq!(ctx.facility.requests.read().await.len(), 1);

        wait(CLEANUP_INTERVAL.as_secs() + 1).await;

        assert_eq!(ctx.facility.requests.read().await.len(), 0);
    }
}
