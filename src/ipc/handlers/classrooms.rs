use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::require_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_classrooms_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    // Counts let the selector show how full each classroom is.
    let classrooms: Vec<serde_json::Value> = state
        .config
        .classrooms
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "studentCount": state.roster.count_in_classroom(&c.id),
            })
        })
        .collect();
    ok(
        &req.id,
        json!({
            "classrooms": classrooms,
            "selectedClassroomId": state.selected_classroom_id,
        }),
    )
}

fn handle_classrooms_select(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let classroom_id = require_str(&req.params, "classroomId")?;
    let Some(classroom) = state.config.classroom(classroom_id) else {
        return Err(HandlerErr::not_found(
            "classroom not found",
            Some(json!({ "classroomId": classroom_id })),
        ));
    };
    let name = classroom.name.clone();
    state.selected_classroom_id = classroom.id.clone();
    tracing::debug!(classroom_id, "classroom selected");
    Ok(ok(
        &req.id,
        json!({
            "selectedClassroomId": state.selected_classroom_id,
            "name": name,
        }),
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classrooms.list" => Some(handle_classrooms_list(state, req)),
        "classrooms.select" => Some(
            handle_classrooms_select(state, req).unwrap_or_else(|e| e.response(&req.id)),
        ),
        _ => None,
    }
}
