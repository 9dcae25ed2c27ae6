use crate::calc::{self, Thresholds};
use crate::ipc::error::HandlerErr;
use crate::model::{Grade, Student};
use serde_json::json;

const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 10.0;
const ATTENDANCE_MIN: f64 = 0.0;
const ATTENDANCE_MAX: f64 = 100.0;

pub fn require_str<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a str, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key), None))
}

/// Absent and null both mean "not given"; any other non-string is rejected.
pub fn opt_str<'a>(
    params: &'a serde_json::Value,
    key: &str,
) -> Result<Option<&'a str>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(HandlerErr::bad_params(
            format!("{} must be a string", key),
            Some(json!({ "field": key, "value": other })),
        )),
    }
}

/// Decodes a cell value the way the grade table sends it: null or blank text
/// clears the cell, otherwise a number or text read by `parse_text`.
fn parse_cell(
    key: &str,
    raw: Option<&serde_json::Value>,
    parse_text: fn(&str) -> Option<f64>,
) -> Result<Option<f64>, HandlerErr> {
    let Some(raw) = raw else {
        return Err(HandlerErr::bad_params(format!("missing {}", key), None));
    };
    let value = match raw {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) if s.trim().is_empty() => return Ok(None),
        serde_json::Value::String(s) => parse_text(s.trim()),
        _ => None,
    };
    match value {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(HandlerErr::bad_params(
            format!("{} must be a number or null", key),
            Some(json!({ "field": key, "value": raw })),
        )),
    }
}

fn parse_decimal(text: &str) -> Option<f64> {
    text.parse::<f64>().ok()
}

/// Reads an optional sign and the leading run of digits, ignoring whatever
/// follows: `"85.7"` and `"85abc"` are 85, `"1e2"` is 1. No digits, no value.
fn parse_leading_int(text: &str) -> Option<f64> {
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude = rest[..digits_len].parse::<f64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

pub fn parse_score(raw: Option<&serde_json::Value>) -> Result<Option<f64>, HandlerErr> {
    let score = parse_cell("score", raw, parse_decimal)?;
    if let Some(v) = score {
        if !(SCORE_MIN..=SCORE_MAX).contains(&v) {
            return Err(HandlerErr::bad_params(
                format!("score must be within {}..={}", SCORE_MIN, SCORE_MAX),
                Some(json!({ "score": v })),
            ));
        }
    }
    Ok(score)
}

/// Attendance is a whole percentage. Text keeps only its leading integer;
/// numbers are truncated toward zero.
pub fn parse_attendance(raw: Option<&serde_json::Value>) -> Result<Option<f64>, HandlerErr> {
    let attendance = parse_cell("attendance", raw, parse_leading_int)?.map(|v| v.trunc() + 0.0);
    if let Some(v) = attendance {
        if !(ATTENDANCE_MIN..=ATTENDANCE_MAX).contains(&v) {
            return Err(HandlerErr::bad_params(
                format!(
                    "attendance must be within {}..={}",
                    ATTENDANCE_MIN, ATTENDANCE_MAX
                ),
                Some(json!({ "attendance": v })),
            ));
        }
    }
    Ok(attendance)
}

pub fn evaluation_json(
    grades: &[Grade],
    attendance: Option<f64>,
    thresholds: &Thresholds,
) -> serde_json::Value {
    let e = calc::evaluate(grades, attendance, thresholds);
    json!({
        "average": e.average,
        "averageDisplay": calc::format_average(e.average),
        "status": e.status,
        "statusLabel": e.status.label(),
        "failedByAttendance": calc::fails_attendance(attendance, thresholds),
    })
}

/// One table row: stored fields plus the figures derived on read.
pub fn student_row(student: &Student, thresholds: &Thresholds) -> serde_json::Value {
    let mut row = json!({
        "id": student.id,
        "name": student.name,
        "classroomId": student.classroom_id,
        "attendance": student.attendance,
        "grades": student.grades,
    });
    let derived = evaluation_json(&student.grades, student.attendance, thresholds);
    if let (Some(obj), serde_json::Value::Object(extra)) = (row.as_object_mut(), derived) {
        obj.extend(extra);
    }
    row
}
