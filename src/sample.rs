use crate::config::GradingConfig;
use crate::roster::Roster;

struct SampleStudent {
    name: &'static str,
    attendance: f64,
    classroom_idx: usize,
    // Score for subject i is `base + (i % spread)`.
    base: f64,
    spread: usize,
}

const SAMPLE_STUDENTS: [SampleStudent; 5] = [
    SampleStudent {
        name: "Ana Silva",
        attendance: 95.0,
        classroom_idx: 0,
        base: 6.0,
        spread: 5,
    },
    SampleStudent {
        name: "Bruno Costa",
        attendance: 80.0,
        classroom_idx: 0,
        base: 3.0,
        spread: 4,
    },
    SampleStudent {
        name: "Carla Dias",
        attendance: 70.0,
        classroom_idx: 0,
        base: 4.0,
        spread: 3,
    },
    SampleStudent {
        name: "Daniel Alves",
        attendance: 90.0,
        classroom_idx: 1,
        base: 5.0,
        spread: 6,
    },
    SampleStudent {
        name: "Elisa Ferreira",
        attendance: 100.0,
        classroom_idx: 1,
        base: 8.0,
        spread: 2,
    },
];

/// Fills the roster with the demo class list. Students whose classroom index
/// is past the configured list land in the last classroom.
pub fn seed(roster: &mut Roster, config: &GradingConfig) -> usize {
    let Some(last) = config.classrooms.len().checked_sub(1) else {
        return 0;
    };
    let mut added = 0;
    for sample in &SAMPLE_STUDENTS {
        let classroom = &config.classrooms[sample.classroom_idx.min(last)];
        let Some(student) = roster.add_student(sample.name, &classroom.id) else {
            continue;
        };
        for (i, subject) in config.subjects.iter().enumerate() {
            let score = sample.base + (i % sample.spread) as f64;
            roster.update_grade(&student.id, subject, Some(score));
        }
        roster.update_attendance(&student.id, Some(sample.attendance));
        added += 1;
    }
    tracing::info!(added, "seeded sample students");
    added
}
