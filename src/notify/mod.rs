mod desktop;
mod timer_facility;

pub use desktop::DesktopNotificationChannel;
pub use timer_facility::TimerNotificationFacility;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub sound: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationOptions {
    pub alert: bool,
    pub sound: bool,
    pub badge: bool,
}

impl AuthorizationOptions {
    pub fn all() -> Self {
        Self {
            alert: true,
            sound: true,
            badge: true,
        }
    }
}

/// A delayed, optionally repeating notification registration. Re-registering
/// under an identifier replaces the prior registration for that identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub identifier: String,
    pub content: NotificationContent,
    pub delay: Duration,
    pub repeats: bool,
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("a repeating notification request must have a non-zero delay")]
    ZeroInterval,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// The external notification subsystem, injected so the scheduler can be
/// driven against a fake.
#[async_trait]
pub trait NotificationFacility: Send + Sync + 'static {
    async fn request_authorization(
        &self,
        options: AuthorizationOptions,
    ) -> Result<bool, NotificationError>;

    async fn add_request(&self, request: NotificationRequest) -> Result<(), NotificationError>;

    /// Unconditional cancel-all. This application owns exclusive use of its
    /// facility instance, so no scoping by identifier is needed.
    async fn remove_all_pending(&self);
}

/// Delivery backend for a single fired notification.
#[async_trait]
pub trait NotificationChannel: Send + Sync + 'static {
    async fn request_authorization(&self, options: AuthorizationOptions) -> anyhow::Result<bool>;

    async fn deliver(&self, content: &NotificationContent) -> anyhow::Result<()>;
}
