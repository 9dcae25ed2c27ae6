mod calc;
mod config;
mod ipc;
mod model;
mod roster;
mod sample;

use anyhow::Context;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rosterd=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Arc::new(config::GradingConfig::from_env().context("load grading config")?);
    tracing::info!(
        subjects = config.subjects.len(),
        classrooms = config.classrooms.len(),
        passing_grade = config.thresholds.passing_grade,
        recovery_grade = config.thresholds.recovery_grade,
        minimum_attendance = config.thresholds.minimum_attendance,
        "starting rosterd",
    );

    let mut state = ipc::AppState::new(Arc::clone(&config));
    if config.seed_sample_students {
        sample::seed(&mut state.roster, &config);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed, shutting down");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            Err(e) => {
                // Can't reply with an id.
                tracing::debug!(error = %e, "undecodable request line");
                ipc::bad_json(e.to_string())
            }
        };
        writeln!(stdout, "{}", resp).context("write response")?;
        stdout.flush().context("flush response")?;
    }

    tracing::info!(students = state.roster.len(), "stdin closed, exiting");
    Ok(())
}
