use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    sync::RwLock,
    task::{self, JoinHandle},
    time::{self, Instant},
};
use tokio_util::sync::CancellationToken;

use super::{CountdownContent, DismissalPolicy, LiveStatusSurface, SurfaceHandle};
use crate::interval::format_hms;

const DISMISS_TIMEOUT: Duration = Duration::from_secs(5);

struct ActiveCountdown {
    task: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

/// Renders the countdown to the next reminder as a periodic log line, the
/// closest console equivalent of a lock-screen countdown widget.
pub struct CountdownStatusSurface {
    tick: Duration,
    activations: Arc<RwLock<HashMap<u64, ActiveCountdown>>>,
    next_handle: AtomicU64,
}

impl CountdownStatusSurface {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            activations: Arc::new(RwLock::new(HashMap::new())),
            next_handle: AtomicU64::new(1),
        }
    }

    pub async fn active_count(&self) -> usize {
        self.activations
            .read()
            .await
            .values()
            .filter(|active| !active.task.is_finished())
            .count()
    }
}

#[async_trait]
impl LiveStatusSurface for CountdownStatusSurface {
    async fn request(&self, initial: CountdownContent) -> anyhow::Result<SurfaceHandle> {
        let handle = SurfaceHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let cancellation_token = CancellationToken::new();
        let task_cancellation_token = cancellation_token.child_token();
        let tick = self.tick;

        let task = task::spawn(async move {
            run_countdown(task_cancellation_token, initial, tick).await;
        });

        self.activations.write().await.insert(
            handle.id(),
            ActiveCountdown {
                task,
                cancellation_token,
            },
        );

        log::info!("Status surface activated. [handle = {}]", handle.id());
        Ok(handle)
    }

    async fn end(&self, handle: SurfaceHandle, _policy: DismissalPolicy) {
        let active = self.activations.write().await.remove(&handle.id());
        match active {
            Some(active) => {
                active.cancellation_token.cancel();
                let _ = time::timeout(DISMISS_TIMEOUT, active.task).await;
                log::info!("Status surface dismissed. [handle = {}]", handle.id());
            }
            None => {
                log::debug!("No such surface activation. [handle = {}]", handle.id());
            }
        }
    }
}

async fn run_countdown(
    cancellation_token: CancellationToken,
    content: CountdownContent,
    tick: Duration,
) {
    if content.total_seconds == 0 {
        // A degenerate interval has no countdown to render.
        return;
    }

    let started = Instant::now();
    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                break;
            }
            _ = time::sleep(tick) => {
                let elapsed = started.elapsed().as_secs();
                let remaining = content.total_seconds - elapsed % content.total_seconds;
                log::info!("[STATUS] Next reminder in {}", format_hms(remaining));
            }
        }
    }
}
