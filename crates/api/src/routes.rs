pub mod attendance;
pub mod cron;
pub mod health;
pub mod notifications;
