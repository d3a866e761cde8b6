use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/attendance/checkin", get(handlers::checkin::get_checkin))
        .route("/api/attendance/events", post(handlers::events::open_event))
        .route(
            "/api/attendance/events/:id/records",
            post(handlers::events::save_records),
        )
        .route(
            "/api/attendance/events/:id/guests",
            get(handlers::events::list_guests).post(handlers::events::add_guest),
        )
        .route(
            "/api/attendance/schedules",
            get(handlers::schedules::list_schedules).post(handlers::schedules::create_schedule),
        )
        .route(
            "/api/attendance/schedules/:id",
            put(handlers::schedules::update_schedule),
        )
}
