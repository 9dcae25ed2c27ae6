use serde::{Deserialize, Serialize};

pub type StudentId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classroom {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub subject: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// One entry per catalog subject, in catalog order.
    pub grades: Vec<Grade>,
    pub attendance: Option<f64>,
    pub classroom_id: String,
}

#[cfg(test)]
impl Student {
    pub fn grade(&self, subject: &str) -> Option<&Grade> {
        self.grades.iter().find(|g| g.subject == subject)
    }
}
