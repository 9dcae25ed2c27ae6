use crate::model::Grade;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Aprovado,
    Recuperacao,
    Reprovado,
    Indefinido,
}

impl Status {
    /// Label shown in the status column.
    pub fn label(self) -> &'static str {
        match self {
            Status::Aprovado => "Aprovado",
            Status::Recuperacao => "Recuperação",
            Status::Reprovado => "Reprovado",
            Status::Indefinido => "Indefinido",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub passing_grade: f64,
    pub recovery_grade: f64,
    pub minimum_attendance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub average: Option<f64>,
    pub status: Status,
}

/// Strict less-than: attendance exactly at the minimum does not fail.
pub fn fails_attendance(attendance: Option<f64>, thresholds: &Thresholds) -> bool {
    matches!(attendance, Some(a) if a < thresholds.minimum_attendance)
}

/// Plain mean over graded subjects only. Ungraded (`None`) scores are left out
/// of both the sum and the count; they are not zeros.
pub fn average(grades: &[Grade]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count: usize = 0;
    for score in grades.iter().filter_map(|g| g.score) {
        // NaN fails this comparison too.
        if score >= 0.0 {
            sum += score;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / (count as f64))
    }
}

/// Derives the average and status for one student.
///
/// Low attendance forces `Reprovado` whatever the grades are, but the average
/// is still reported. Threshold comparisons on the average are inclusive.
pub fn evaluate(grades: &[Grade], attendance: Option<f64>, thresholds: &Thresholds) -> Evaluation {
    let avg = average(grades);

    if fails_attendance(attendance, thresholds) {
        return Evaluation {
            average: avg,
            status: Status::Reprovado,
        };
    }

    let Some(avg) = avg else {
        return Evaluation {
            average: None,
            status: Status::Indefinido,
        };
    };

    let status = if avg >= thresholds.passing_grade {
        Status::Aprovado
    } else if avg >= thresholds.recovery_grade {
        Status::Recuperacao
    } else {
        Status::Reprovado
    };

    Evaluation {
        average: Some(avg),
        status,
    }
}

pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(v) => format!("{:.1}", v),
        None => "-".to_string(),
    }
}
