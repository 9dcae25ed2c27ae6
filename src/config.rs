use crate::calc::Thresholds;
use crate::model::Classroom;
use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

pub const CONFIG_ENV: &str = "ROSTERD_CONFIG";

const DEFAULT_SUBJECTS: [&str; 5] = [
    "Português",
    "Matemática",
    "Ciências",
    "História",
    "Geografia",
];

/// Session constants. Read once at start, never changed afterwards.
#[derive(Debug, Clone)]
pub struct GradingConfig {
    pub subjects: Arc<[String]>,
    pub thresholds: Thresholds,
    pub classrooms: Vec<Classroom>,
    pub seed_sample_students: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
    subjects: Option<Vec<String>>,
    passing_grade: Option<f64>,
    recovery_grade: Option<f64>,
    minimum_attendance: Option<f64>,
    classrooms: Option<Vec<Classroom>>,
    seed_sample_students: Option<bool>,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            subjects: DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect(),
            thresholds: Thresholds {
                passing_grade: 7.0,
                recovery_grade: 5.0,
                minimum_attendance: 75.0,
            },
            classrooms: vec![
                classroom("turma-a", "Turma A"),
                classroom("turma-b", "Turma B"),
                classroom("turma-c", "Turma C"),
            ],
            seed_sample_students: false,
        }
    }
}

fn classroom(id: &str, name: &str) -> Classroom {
    Classroom {
        id: id.to_string(),
        name: name.to_string(),
    }
}

impl GradingConfig {
    /// Loads from the file named by `ROSTERD_CONFIG`, or defaults when unset.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("config {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let raw: RawConfig = serde_json::from_str(text).context("parse config json")?;
        let defaults = Self::default();
        let cfg = Self {
            subjects: match raw.subjects {
                Some(v) => v.into(),
                None => defaults.subjects,
            },
            thresholds: Thresholds {
                passing_grade: raw
                    .passing_grade
                    .unwrap_or(defaults.thresholds.passing_grade),
                recovery_grade: raw
                    .recovery_grade
                    .unwrap_or(defaults.thresholds.recovery_grade),
                minimum_attendance: raw
                    .minimum_attendance
                    .unwrap_or(defaults.thresholds.minimum_attendance),
            },
            classrooms: raw.classrooms.unwrap_or(defaults.classrooms),
            seed_sample_students: raw
                .seed_sample_students
                .unwrap_or(defaults.seed_sample_students),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.subjects.is_empty() {
            bail!("subjects must not be empty");
        }
        let mut seen = HashSet::new();
        for s in self.subjects.iter() {
            if s.trim().is_empty() {
                bail!("subject names must not be blank");
            }
            if !seen.insert(s.as_str()) {
                bail!("duplicate subject: {}", s);
            }
        }

        if self.classrooms.is_empty() {
            bail!("classrooms must not be empty");
        }
        let mut seen = HashSet::new();
        for c in &self.classrooms {
            if c.id.trim().is_empty() {
                bail!("classroom ids must not be blank");
            }
            if !seen.insert(c.id.as_str()) {
                bail!("duplicate classroom id: {}", c.id);
            }
        }

        let t = &self.thresholds;
        let grade_range = 0.0..=10.0;
        if !grade_range.contains(&t.recovery_grade) || !grade_range.contains(&t.passing_grade) {
            bail!("grade thresholds must be within 0..=10");
        }
        if t.recovery_grade >= t.passing_grade {
            bail!(
                "recoveryGrade ({}) must be below passingGrade ({})",
                t.recovery_grade,
                t.passing_grade
            );
        }
        if !(0.0..=100.0).contains(&t.minimum_attendance) {
            bail!("minimumAttendance must be within 0..=100");
        }
        Ok(())
    }

    pub fn classroom(&self, classroom_id: &str) -> Option<&Classroom> {
        self.classrooms.iter().find(|c| c.id == classroom_id)
    }
}
