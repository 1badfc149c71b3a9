use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::watch;

use crate::{
    interval::ReminderInterval,
    notify::{NotificationContent, NotificationFacility, NotificationRequest},
    status::{CountdownContent, DismissalPolicy, LiveStatusSurface, SurfaceHandle},
};

/// Constant registration identifier: re-registering under it replaces the
/// prior registration, so at most one reminder is ever pending.
pub const REMINDER_IDENTIFIER: &str = "parent-checkin-reminder";

const REMINDER_TITLE: &str = "Parent check-in";
const REMINDER_BODY: &str = "It's time to message your parent!";

/// Published scheduler state, consumed by any display surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub is_active: bool,
    pub next_fire_at: Option<DateTime<Utc>>,
}

/// Two-state reminder machine: `Idle` until `start`, `Active` until `stop`.
/// Lives for the process lifetime and owns the external registrations it
/// creates: `stop` (and quitting through the console) cancels everything
/// pending at the facility, so no dangling external state survives it.
pub struct ReminderScheduler {
    facility: Arc<dyn NotificationFacility>,
    surface: Arc<dyn LiveStatusSurface>,
    status_tx: watch::Sender<SchedulerStatus>,
    surface_handle: Option<SurfaceHandle>,
}

impl ReminderScheduler {
    pub fn new(facility: Arc<dyn NotificationFacility>, surface: Arc<dyn LiveStatusSurface>) -> Self {
        let (status_tx, _) = watch::channel(SchedulerStatus::default());

        Self {
            facility,
            surface,
            status_tx,
            surface_handle: None,
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        self.status_tx.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.status_tx.borrow().is_active
    }

    pub fn next_fire_at(&self) -> Option<DateTime<Utc>> {
        self.status_tx.borrow().next_fire_at
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerStatus> {
        self.status_tx.subscribe()
    }

    /// Registers a repeating notification for the interval and publishes the
    /// active state. The active flag reflects the user's intent and is
    /// published before the registration is acknowledged; `next_fire_at` is
    /// only published once the facility accepts the request. A repeated
    /// `start` re-registers under the same identifier, replacing the prior
    /// registration.
    pub async fn start(&mut self, interval: &ReminderInterval) {
        let total_seconds = interval.total_seconds();
        log::info!("Starting reminders. [interval = {interval}]");

        self.status_tx.send_modify(|status| status.is_active = true);

        let request = NotificationRequest {
            identifier: REMINDER_IDENTIFIER.to_owned(),
            content: NotificationContent {
                title: REMINDER_TITLE.to_owned(),
                body: REMINDER_BODY.to_owned(),
                sound: true,
            },
            delay: Duration::from_secs(total_seconds),
            repeats: true,
        };

        match self.facility.add_request(request).await {
            Ok(()) => {
                let next_fire_at = Utc::now() + TimeDelta::seconds(total_seconds as i64);
                self.status_tx
                    .send_modify(|status| status.next_fire_at = Some(next_fire_at));
            }
            Err(error) => {
                log::error!("Failed to register the reminder notification: {error}");
            }
        }

        self.activate_surface(total_seconds).await;
    }

    /// Clears the published state, cancels every pending registration at the
    /// facility and dismisses the companion surface immediately.
    pub async fn stop(&mut self) {
        log::info!("Stopping reminders");

        self.status_tx.send_replace(SchedulerStatus::default());
        self.facility.remove_all_pending().await;

        if let Some(handle) = self.surface_handle.take() {
            self.surface.end(handle, DismissalPolicy::Immediate).await;
        }
    }

    async fn activate_surface(&mut self, total_seconds: u64) {
        if let Some(handle) = self.surface_handle.take() {
            self.surface.end(handle, DismissalPolicy::Immediate).await;
        }

        match self.surface.request(CountdownContent { total_seconds }).await {
            Ok(handle) => self.surface_handle = Some(handle),
            Err(error) => {
                log::error!("Failed to activate the status surface: {error:#}");
            }
        }
    }
}
