use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use fighter_core::{
    build_command, Command, GameStateSnapshot, MacroLibrary, PlayerSide,
};

use crate::profiles::{create_session, profile_ids};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunMetrics {
    pub profile_id: String,
    pub side: PlayerSide,
    pub seed: u32,
    pub ticks: u64,
    pub active_ticks: u64,
    pub direction_ticks: u64,
    pub attack_ticks: u64,
    pub macros_started: u64,
    pub macros_completed: u64,
    pub macros_aborted: u64,
    pub neutral_fallbacks: u64,
    pub starts_by_name: BTreeMap<String, u64>,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub commands: Vec<Command>,
}

/// Drives one profile through a snapshot trace, one tick per snapshot, and
/// collects the emitted commands plus per-run accounting.
pub fn run_profile(
    profile_id: &str,
    side: PlayerSide,
    seed: u32,
    trace: &[GameStateSnapshot],
) -> Result<RunArtifact> {
    if trace.is_empty() {
        return Err(anyhow!("run requires a non-empty trace"));
    }

    let library = Arc::new(MacroLibrary::builtin());
    let mut session = create_session(profile_id, side, library, seed).ok_or_else(|| {
        let available = profile_ids().join(", ");
        anyhow!("unknown profile '{profile_id}'. available: {available}")
    })?;

    let mut commands = Vec::with_capacity(trace.len());
    let mut active_ticks = 0u64;
    let mut direction_ticks = 0u64;
    let mut attack_ticks = 0u64;

    for snapshot in trace {
        let buttons = *session.tick(snapshot);
        if !buttons.is_neutral() {
            active_ticks += 1;
        }
        if buttons.any_direction() {
            direction_ticks += 1;
        }
        if buttons.any_attack() {
            attack_ticks += 1;
        }

        let command = match side {
            PlayerSide::One => build_command(&buttons, &fighter_core::ButtonState::neutral()),
            PlayerSide::Two => build_command(&fighter_core::ButtonState::neutral(), &buttons),
        };
        commands.push(command);
    }

    let stats = session.stats();
    info!(
        profile = profile_id,
        seed,
        ticks = stats.ticks,
        macros_started = stats.macros_started,
        neutral_fallbacks = stats.neutral_fallbacks,
        "trace run finished"
    );
    Ok(RunArtifact {
        metrics: RunMetrics {
            profile_id: profile_id.to_string(),
            side,
            seed,
            ticks: stats.ticks,
            active_ticks,
            direction_ticks,
            attack_ticks,
            macros_started: stats.macros_started,
            macros_completed: stats.macros_completed,
            macros_aborted: stats.macros_aborted,
            neutral_fallbacks: stats.neutral_fallbacks,
            starts_by_name: stats.starts_by_name.clone(),
        },
        commands,
    })
}

/// Writes emitted commands as JSON lines, one per tick.
pub fn write_commands_jsonl(path: &Path, commands: &[Command]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = String::new();
    for command in commands {
        out.push_str(&serde_json::to_string(command).context("failed to serialize command")?);
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("failed writing {}", path.display()))
}
