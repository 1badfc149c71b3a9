use async_trait::async_trait;
use notify_rust::Notification;
use tokio::task;

use super::{AuthorizationOptions, NotificationChannel, NotificationContent};

const APPNAME: &str = "phonehome";

#[cfg(target_os = "macos")]
const SOUND_NAME: &str = "Glass";
#[cfg(all(unix, not(target_os = "macos")))]
const SOUND_NAME: &str = "message-new-instant";
#[cfg(windows)]
const SOUND_NAME: &str = "Default";

/// Delivers fired notifications through the desktop notification daemon.
#[derive(Default)]
pub struct DesktopNotificationChannel;

impl DesktopNotificationChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationChannel for DesktopNotificationChannel {
    async fn request_authorization(&self, _options: AuthorizationOptions) -> anyhow::Result<bool> {
        // The desktop daemon has no authorization prompt; reachability is the
        // closest equivalent where the platform exposes it.
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            let reachable =
                task::spawn_blocking(|| notify_rust::get_capabilities().is_ok()).await?;
            Ok(reachable)
        }
        #[cfg(not(all(unix, not(target_os = "macos"))))]
        {
            Ok(true)
        }
    }

    async fn deliver(&self, content: &NotificationContent) -> anyhow::Result<()> {
        let content = content.clone();
        task::spawn_blocking(move || -> anyhow::Result<()> {
            let mut notification = Notification::new();
            notification
                .appname(APPNAME)
                .summary(&content.title)
                .body(&content.body);
            if content.sound {
                notification.sound_name(SOUND_NAME);
            }
            notification.show()?;
            Ok(())
        })
        .await?
    }
}
