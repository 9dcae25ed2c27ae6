use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rosterd");
    let mut child = Command::new(exe)
        .env_remove("ROSTERD_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rosterd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().expect("result")
}

fn error_code(value: &serde_json::Value) -> Option<&str> {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
}

fn create(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    name: &str,
    classroom_id: &str,
) -> String {
    let result = request_ok(
        stdin,
        reader,
        id,
        "students.create",
        json!({ "name": name, "classroomId": classroom_id }),
    );
    assert_eq!(result["created"], json!(true));
    result["student"]["id"]
        .as_str()
        .expect("student id")
        .to_string()
}

fn ids(list: &serde_json::Value) -> Vec<String> {
    list["students"]
        .as_array()
        .expect("students array")
        .iter()
        .map(|s| s["id"].as_str().expect("id").to_string())
        .collect()
}

#[test]
fn new_students_start_ungraded_with_full_attendance() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "name": "Ana Silva", "classroomId": "turma-a" }),
    );
    let student = &created["student"];
    assert_eq!(student["name"], json!("Ana Silva"));
    assert_eq!(student["attendance"], json!(100.0));
    assert_eq!(student["status"], json!("Indefinido"));
    assert_eq!(student["average"], json!(null));
    assert_eq!(student["averageDisplay"], json!("-"));
    let grades = student["grades"].as_array().expect("grades");
    let subjects: Vec<&str> = grades
        .iter()
        .map(|g| g["subject"].as_str().expect("subject"))
        .collect();
    assert_eq!(
        subjects,
        vec!["Português", "Matemática", "Ciências", "História", "Geografia"]
    );
    assert!(grades.iter().all(|g| g["score"].is_null()));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn blank_names_leave_roster_unchanged() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    for (i, name) in ["", "   ", "\t\n"].iter().enumerate() {
        let result = request_ok(
            &mut stdin,
            &mut reader,
            &format!("c{}", i),
            "students.create",
            json!({ "name": name }),
        );
        assert_eq!(result["created"], json!(false));
        assert!(result.get("student").is_none());
    }
    let health = request_ok(&mut stdin, &mut reader, "h", "health", json!({}));
    assert_eq!(health["studentCount"], json!(0));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn filter_by_classroom_keeps_insertion_order() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let a1 = create(&mut stdin, &mut reader, "1", "A1", "turma-a");
    let b1 = create(&mut stdin, &mut reader, "2", "B1", "turma-b");
    let a2 = create(&mut stdin, &mut reader, "3", "A2", "turma-a");
    let _c1 = create(&mut stdin, &mut reader, "4", "C1", "turma-c");
    let a3 = create(&mut stdin, &mut reader, "5", "A3", "turma-a");

    let list = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.list",
        json!({ "classroomId": "turma-a" }),
    );
    assert_eq!(list["classroomName"], json!("Turma A"));
    assert_eq!(ids(&list), vec![a1.clone(), a2.clone(), a3.clone()]);

    // Default filter key is the selected classroom.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "classrooms.select",
        json!({ "classroomId": "turma-b" }),
    );
    let list = request_ok(&mut stdin, &mut reader, "8", "students.list", json!({}));
    assert_eq!(list["classroomId"], json!("turma-b"));
    assert_eq!(ids(&list), vec![b1]);

    let all = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "students.list",
        json!({ "all": true }),
    );
    assert_eq!(ids(&all).len(), 5);
    assert_eq!(ids(&all)[0], a1);

    let classes = request_ok(&mut stdin, &mut reader, "10", "classrooms.list", json!({}));
    let counts: Vec<u64> = classes["classrooms"]
        .as_array()
        .expect("classrooms")
        .iter()
        .map(|c| c["studentCount"].as_u64().expect("count"))
        .collect();
    assert_eq!(counts, vec![3, 1, 1]);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn unknown_classroom_is_not_found() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "name": "Ana", "classroomId": "turma-z" }),
    );
    assert_eq!(error_code(&resp), Some("not_found"));
    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "classrooms.select",
        json!({ "classroomId": "turma-z" }),
    );
    assert_eq!(error_code(&resp), Some("not_found"));
    let classes = request_ok(&mut stdin, &mut reader, "3", "classrooms.list", json!({}));
    assert_eq!(classes["selectedClassroomId"], json!("turma-a"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn grade_update_changes_one_entry_of_one_student() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let a = create(&mut stdin, &mut reader, "1", "A", "turma-a");
    let b = create(&mut stdin, &mut reader, "2", "B", "turma-a");
    let before_b = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.get",
        json!({ "studentId": b }),
    );

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.updateGrade",
        json!({ "studentId": a, "subject": "História", "score": "8.5" }),
    );
    assert_eq!(result["applied"], json!(true));

    let after_a = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "students.get",
        json!({ "studentId": a }),
    );
    let grades = after_a["student"]["grades"].as_array().expect("grades");
    for g in grades {
        if g["subject"] == json!("História") {
            assert_eq!(g["score"], json!(8.5));
        } else {
            assert!(g["score"].is_null(), "{}", g);
        }
    }
    assert_eq!(after_a["student"]["attendance"], json!(100.0));
    assert_eq!(after_a["student"]["average"], json!(8.5));
    assert_eq!(after_a["student"]["status"], json!("Aprovado"));

    let after_b = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.get",
        json!({ "studentId": b }),
    );
    assert_eq!(before_b, after_b);

    let unknown_subject = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "students.updateGrade",
        json!({ "studentId": a, "subject": "Artes", "score": 3 }),
    );
    assert_eq!(unknown_subject["applied"], json!(false));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn out_of_range_input_is_rejected_before_the_store() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let a = create(&mut stdin, &mut reader, "1", "A", "turma-a");
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.updateGrade",
        json!({ "studentId": a, "subject": "Matemática", "score": 6 }),
    );

    for (i, score) in [json!(10.5), json!(-1), json!("abc")].iter().enumerate() {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("g{}", i),
            "students.updateGrade",
            json!({ "studentId": a, "subject": "Matemática", "score": score }),
        );
        assert_eq!(error_code(&resp), Some("bad_params"));
    }
    for (i, attendance) in [json!(101), json!(-5), json!("x")].iter().enumerate() {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("a{}", i),
            "students.updateAttendance",
            json!({ "studentId": a, "attendance": attendance }),
        );
        assert_eq!(error_code(&resp), Some("bad_params"));
    }

    let s = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.get",
        json!({ "studentId": a }),
    );
    assert_eq!(s["student"]["attendance"], json!(100.0));
    assert_eq!(s["student"]["grades"][1]["score"], json!(6.0));

    // Blank text clears the cell.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.updateGrade",
        json!({ "studentId": a, "subject": "Matemática", "score": "" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "students.updateAttendance",
        json!({ "studentId": a, "attendance": null }),
    );
    let s = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.get",
        json!({ "studentId": a }),
    );
    assert!(s["student"]["grades"][1]["score"].is_null());
    assert!(s["student"]["attendance"].is_null());
    assert_eq!(s["student"]["status"], json!("Indefinido"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn deleted_ids_become_no_ops() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let a = create(&mut stdin, &mut reader, "1", "A", "turma-a");
    let b = create(&mut stdin, &mut reader, "2", "B", "turma-a");
    let c = create(&mut stdin, &mut reader, "3", "C", "turma-a");

    let del = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.delete",
        json!({ "studentId": b }),
    );
    assert_eq!(del["deleted"], json!(true));
    let health = request_ok(&mut stdin, &mut reader, "5", "health", json!({}));
    assert_eq!(health["studentCount"], json!(2));

    let again = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "students.delete",
        json!({ "studentId": b }),
    );
    assert_eq!(again["deleted"], json!(false));
    let health = request_ok(&mut stdin, &mut reader, "7", "health", json!({}));
    assert_eq!(health["studentCount"], json!(2));

    let grade = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "students.updateGrade",
        json!({ "studentId": b, "subject": "Matemática", "score": 9 }),
    );
    assert_eq!(grade["applied"], json!(false));
    let attendance = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "students.updateAttendance",
        json!({ "studentId": b, "attendance": 50 }),
    );
    assert_eq!(attendance["applied"], json!(false));
    let get = request(
        &mut stdin,
        &mut reader,
        "10",
        "students.get",
        json!({ "studentId": b }),
    );
    assert_eq!(error_code(&get), Some("not_found"));

    let list = request_ok(&mut stdin, &mut reader, "11", "students.list", json!({}));
    assert_eq!(ids(&list), vec![a, c]);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn non_string_classroom_id_is_rejected_not_defaulted() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "name": "X", "classroomId": 2 }),
    );
    assert_eq!(error_code(&resp), Some("bad_params"));
    assert_eq!(resp["error"]["message"], json!("classroomId must be a string"));
    let health = request_ok(&mut stdin, &mut reader, "2", "health", json!({}));
    assert_eq!(health["studentCount"], json!(0));

    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "students.list",
        json!({ "classroomId": ["turma-a"] }),
    );
    assert_eq!(error_code(&resp), Some("bad_params"));

    // Null still means "use the selected classroom".
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.create",
        json!({ "name": "Y", "classroomId": null }),
    );
    assert_eq!(created["student"]["classroomId"], json!("turma-a"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn attendance_text_is_read_up_to_the_first_non_digit() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let a = create(&mut stdin, &mut reader, "1", "A", "turma-a");
    for (i, (text, stored)) in [("1e2", 1.0), ("85abc", 85.0), ("92.6", 92.0)]
        .iter()
        .enumerate()
    {
        let result = request_ok(
            &mut stdin,
            &mut reader,
            &format!("u{}", i),
            "students.updateAttendance",
            json!({ "studentId": a, "attendance": text }),
        );
        assert_eq!(result["applied"], json!(true));
        let s = request_ok(
            &mut stdin,
            &mut reader,
            &format!("g{}", i),
            "students.get",
            json!({ "studentId": a }),
        );
        assert_eq!(s["student"]["attendance"], json!(stored), "input {}", text);
    }

    drop(stdin);
    let _ = child.wait();
}
