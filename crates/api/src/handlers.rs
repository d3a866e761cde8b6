pub mod checkin;
pub mod cron;
pub mod events;
pub mod notifications;
pub mod schedules;
