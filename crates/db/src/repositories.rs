pub mod event;
pub mod group;
pub mod guest;
pub mod notification;
pub mod record;
pub mod schedule;
pub mod session;
