use crate::model::{Grade, Student};
use std::sync::Arc;
use uuid::Uuid;

pub type Snapshot = Arc<[Arc<Student>]>;

/// Sole owner of the student collection.
///
/// Mutations never edit a student in place: each one swaps in a new slice,
/// reusing the `Arc` of every student it did not touch. A `Snapshot` taken
/// earlier keeps seeing the collection as it was.
pub struct Roster {
    subjects: Arc<[String]>,
    students: Snapshot,
}

impl Roster {
    pub fn new(subjects: Arc<[String]>) -> Self {
        Self {
            subjects,
            students: Arc::from(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.students)
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn get(&self, student_id: &str) -> Option<Arc<Student>> {
        self.students.iter().find(|s| s.id == student_id).cloned()
    }

    /// Stable filter: keeps insertion order.
    pub fn filter_by_classroom(&self, classroom_id: &str) -> Vec<Arc<Student>> {
        self.students
            .iter()
            .filter(|s| s.classroom_id == classroom_id)
            .cloned()
            .collect()
    }

    pub fn count_in_classroom(&self, classroom_id: &str) -> usize {
        self.students
            .iter()
            .filter(|s| s.classroom_id == classroom_id)
            .count()
    }

    /// Returns `None` (and leaves the roster alone) when the name is blank.
    pub fn add_student(&mut self, name: &str, classroom_id: &str) -> Option<Student> {
        if name.trim().is_empty() {
            return None;
        }
        let student = Student {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            grades: self
                .subjects
                .iter()
                .map(|subject| Grade {
                    subject: subject.clone(),
                    score: None,
                })
                .collect(),
            attendance: Some(100.0),
            classroom_id: classroom_id.to_string(),
        };

        let mut next: Vec<Arc<Student>> = Vec::with_capacity(self.students.len() + 1);
        next.extend(self.students.iter().cloned());
        next.push(Arc::new(student.clone()));
        self.students = Arc::from(next);

        tracing::debug!(student_id = %student.id, classroom_id, "student added");
        Some(student)
    }

    pub fn update_grade(&mut self, student_id: &str, subject: &str, score: Option<f64>) -> bool {
        let applied = self.replace_one(student_id, |s| {
            let idx = s.grades.iter().position(|g| g.subject == subject)?;
            let mut next = s.clone();
            next.grades[idx].score = score;
            Some(next)
        });
        tracing::debug!(student_id, subject, ?score, applied, "grade update");
        applied
    }

    pub fn update_attendance(&mut self, student_id: &str, attendance: Option<f64>) -> bool {
        let applied = self.replace_one(student_id, |s| {
            Some(Student {
                attendance,
                ..s.clone()
            })
        });
        tracing::debug!(student_id, ?attendance, applied, "attendance update");
        applied
    }

    pub fn delete_student(&mut self, student_id: &str) -> bool {
        if !self.students.iter().any(|s| s.id == student_id) {
            tracing::debug!(student_id, "delete of unknown student ignored");
            return false;
        }
        let next: Vec<Arc<Student>> = self
            .students
            .iter()
            .filter(|s| s.id != student_id)
            .cloned()
            .collect();
        self.students = Arc::from(next);
        tracing::debug!(student_id, "student deleted");
        true
    }

    fn replace_one<F>(&mut self, student_id: &str, f: F) -> bool
    where
        F: FnOnce(&Student) -> Option<Student>,
    {
        let Some(pos) = self.students.iter().position(|s| s.id == student_id) else {
            return false;
        };
        let Some(replacement) = f(&self.students[pos]) else {
            return false;
        };
        let mut next: Vec<Arc<Student>> = self.students.to_vec();
        next[pos] = Arc::new(replacement);
        self.students = Arc::from(next);
        true
    }
}
