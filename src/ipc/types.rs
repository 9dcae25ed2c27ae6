use crate::config::GradingConfig;
use crate::roster::Roster;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Arc<GradingConfig>,
    pub roster: Roster,
    /// Filter key for list/create calls that omit `classroomId`.
    pub selected_classroom_id: String,
}

impl AppState {
    pub fn new(config: Arc<GradingConfig>) -> Self {
        let roster = Roster::new(config.subjects.clone());
        let selected_classroom_id = config
            .classrooms
            .first()
            .map(|c| c.id.clone())
            .unwrap_or_default();
        Self {
            config,
            roster,
            selected_classroom_id,
        }
    }
}
