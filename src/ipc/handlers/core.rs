use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "studentCount": state.roster.len(),
        }),
    )
}

fn handle_config_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let cfg = &state.config;
    ok(
        &req.id,
        json!({
            "subjects": cfg.subjects.as_ref(),
            "passingGrade": cfg.thresholds.passing_grade,
            "recoveryGrade": cfg.thresholds.recovery_grade,
            "minimumAttendance": cfg.thresholds.minimum_attendance,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "config.get" => Some(handle_config_get(state, req)),
        _ => None,
    }
}
