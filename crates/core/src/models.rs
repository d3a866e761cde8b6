pub mod checkin;
pub mod event;
pub mod group;
pub mod notification;
pub mod record;
pub mod schedule;
