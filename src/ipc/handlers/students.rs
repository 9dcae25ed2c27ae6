use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{opt_str, parse_attendance, parse_score, require_str, student_row};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

type HandlerResult = Result<serde_json::Value, HandlerErr>;

/// Explicit `classroomId` param, else (absent or null) the session's selected
/// classroom.
fn resolve_classroom_id(state: &AppState, req: &Request) -> Result<String, HandlerErr> {
    let classroom_id = opt_str(&req.params, "classroomId")?
        .unwrap_or(&state.selected_classroom_id)
        .to_string();
    if state.config.classroom(&classroom_id).is_none() {
        return Err(HandlerErr::not_found(
            "classroom not found",
            Some(json!({ "classroomId": classroom_id })),
        ));
    }
    Ok(classroom_id)
}

fn handle_students_list(state: &mut AppState, req: &Request) -> HandlerResult {
    let thresholds = &state.config.thresholds;
    if req.params.get("all").and_then(|v| v.as_bool()) == Some(true) {
        let students: Vec<serde_json::Value> = state
            .roster
            .snapshot()
            .iter()
            .map(|s| student_row(s, thresholds))
            .collect();
        return Ok(ok(&req.id, json!({ "students": students })));
    }

    let classroom_id = resolve_classroom_id(state, req)?;
    let students: Vec<serde_json::Value> = state
        .roster
        .filter_by_classroom(&classroom_id)
        .iter()
        .map(|s| student_row(s, thresholds))
        .collect();
    let classroom_name = state
        .config
        .classroom(&classroom_id)
        .map(|c| c.name.clone());
    Ok(ok(
        &req.id,
        json!({
            "classroomId": classroom_id,
            "classroomName": classroom_name,
            "students": students,
        }),
    ))
}

fn handle_students_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let student_id = require_str(&req.params, "studentId")?;
    let Some(student) = state.roster.get(student_id) else {
        return Err(HandlerErr::not_found(
            "student not found",
            Some(json!({ "studentId": student_id })),
        ));
    };
    Ok(ok(
        &req.id,
        json!({ "student": student_row(&student, &state.config.thresholds) }),
    ))
}

fn handle_students_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let name = require_str(&req.params, "name")?;
    let classroom_id = resolve_classroom_id(state, req)?;
    match state.roster.add_student(name, &classroom_id) {
        Some(student) => Ok(ok(
            &req.id,
            json!({
                "created": true,
                "student": student_row(&student, &state.config.thresholds),
            }),
        )),
        None => {
            tracing::debug!("blank student name ignored");
            Ok(ok(&req.id, json!({ "created": false })))
        }
    }
}

fn handle_students_update_grade(state: &mut AppState, req: &Request) -> HandlerResult {
    let student_id = require_str(&req.params, "studentId")?;
    let subject = require_str(&req.params, "subject")?;
    let score = parse_score(req.params.get("score"))?;
    let applied = state.roster.update_grade(student_id, subject, score);
    Ok(ok(&req.id, json!({ "applied": applied })))
}

fn handle_students_update_attendance(state: &mut AppState, req: &Request) -> HandlerResult {
    let student_id = require_str(&req.params, "studentId")?;
    let attendance = parse_attendance(req.params.get("attendance"))?;
    let applied = state.roster.update_attendance(student_id, attendance);
    Ok(ok(&req.id, json!({ "applied": applied })))
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let student_id = require_str(&req.params, "studentId")?;
    let deleted = state.roster.delete_student(student_id);
    Ok(ok(&req.id, json!({ "deleted": deleted })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => handle_students_list(state, req),
        "students.get" => handle_students_get(state, req),
        "students.create" => handle_students_create(state, req),
        "students.updateGrade" => handle_students_update_grade(state, req),
        "students.updateAttendance" => handle_students_update_attendance(state, req),
        "students.delete" => handle_students_delete(state, req),
        _ => return None,
    };
    Some(result.unwrap_or_else(|e| {
        tracing::debug!(
            method = %req.method,
            code = e.code,
            message = %e.message,
            "request rejected"
        );
        e.response(&req.id)
    }))
}
