use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::helpers::{evaluation_json, parse_attendance, parse_score};
use crate::ipc::types::{AppState, Request};
use crate::model::Grade;
use serde_json::json;

/// Evaluates grades that are not on the roster, e.g. a row still being edited.
fn handle_calc_evaluate(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let Some(raw_grades) = req.params.get("grades").and_then(|v| v.as_array()) else {
        return Err(HandlerErr::bad_params("missing grades", None));
    };
    let mut grades = Vec::with_capacity(raw_grades.len());
    for (idx, raw) in raw_grades.iter().enumerate() {
        let subject = raw
            .get("subject")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let score = parse_score(raw.get("score")).map_err(|mut e| {
            let mut details = match e.details.take() {
                Some(serde_json::Value::Object(map)) => map,
                _ => serde_json::Map::new(),
            };
            details.insert("index".to_string(), json!(idx));
            details.insert("subject".to_string(), json!(subject));
            e.details = Some(serde_json::Value::Object(details));
            e
        })?;
        grades.push(Grade { subject, score });
    }
    let attendance = match req.params.get("attendance") {
        None => None,
        raw => parse_attendance(raw)?,
    };
    Ok(ok(
        &req.id,
        evaluation_json(&grades, attendance, &state.config.thresholds),
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "calc.evaluate" => {
            Some(handle_calc_evaluate(state, req).unwrap_or_else(|e| e.response(&req.id)))
        }
        _ => None,
    }
}
