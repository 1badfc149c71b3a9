use std::{sync::Arc, time::Duration};

use anyhow::Context;

use phonehome::{
    appsettings::AppSettings,
    console::{self, ConsoleInteractionInterface},
    notify::{DesktopNotificationChannel, NotificationFacility, TimerNotificationFacility},
    scheduling::ReminderScheduler,
    status::{CountdownStatusSurface, LiveStatusSurface, NullStatusSurface},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = AppSettings::load().context("Failed to load application settings")?;

    let channel = Arc::new(DesktopNotificationChannel::new());
    let facility: Arc<dyn NotificationFacility> = Arc::new(TimerNotificationFacility::new(channel));

    console::ensure_notification_authorization(facility.as_ref()).await;

    let surface: Arc<dyn LiveStatusSurface> = if settings.status.enabled {
        Arc::new(CountdownStatusSurface::new(Duration::from_secs(
            settings.status.tick_seconds,
        )))
    } else {
        Arc::new(NullStatusSurface)
    };

    let scheduler = ReminderScheduler::new(Arc::clone(&facility), surface);
    let interval = settings.reminder.initial_interval();

    ConsoleInteractionInterface::start(scheduler, interval).await
}
