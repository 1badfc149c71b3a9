mod scheduler;

pub use scheduler::{REMINDER_IDENTIFIER, ReminderScheduler, SchedulerStatus};
