use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use fighter_core::rng::SeededRng;
use fighter_core::{GameStateSnapshot, PlayerSnapshot};

const ARENA_LEFT: i32 = 40;
const ARENA_RIGHT: i32 = 472;
const STARTING_HEALTH: i32 = 176;
const ROUND_TIMER: i32 = 99;
const PRE_ROUND_TICKS: u32 = 30;
const TICKS_PER_TIMER_SECOND: u32 = 60;

/// Deterministic synthetic match trace: two players drift around the arena,
/// trade damage in close range, and the round ends on a knockout or when the
/// timer runs out. Stands in for the emulator bridge during offline runs.
pub fn synth_trace(seed: u32, max_ticks: u32) -> Vec<GameStateSnapshot> {
    let mut rng = SeededRng::new(seed);
    let mut p1_x = ARENA_LEFT + 100;
    let mut p2_x = ARENA_RIGHT - 100;
    let mut p1_health = STARTING_HEALTH;
    let mut p2_health = STARTING_HEALTH;

    let mut out = Vec::with_capacity(max_ticks as usize);
    for tick in 0..max_ticks {
        let has_round_started = tick >= PRE_ROUND_TICKS;
        let elapsed_seconds = tick.saturating_sub(PRE_ROUND_TICKS) / TICKS_PER_TIMER_SECOND;
        let timer = (ROUND_TIMER - elapsed_seconds as i32).max(0);

        if has_round_started {
            p1_x = (p1_x + rng.next_range(-3, 4)).clamp(ARENA_LEFT, ARENA_RIGHT);
            p2_x = (p2_x + rng.next_range(-4, 3)).clamp(ARENA_LEFT, ARENA_RIGHT);

            if (p1_x - p2_x).abs() < 40 && rng.next_int(8) == 0 {
                if rng.next_int(2) == 0 {
                    p1_health = (p1_health - rng.next_range(2, 12)).max(0);
                } else {
                    p2_health = (p2_health - rng.next_range(2, 12)).max(0);
                }
            }
        }

        let knockout = p1_health == 0 || p2_health == 0;
        let is_round_over = has_round_started && (knockout || timer == 0);

        out.push(GameStateSnapshot {
            player1: PlayerSnapshot {
                id: 1,
                health: p1_health,
                x: p1_x,
                y: 0,
                is_jumping: has_round_started && rng.next_int(40) == 0,
                is_crouching: has_round_started && rng.next_int(24) == 0,
            },
            player2: PlayerSnapshot {
                id: 2,
                health: p2_health,
                x: p2_x,
                y: 0,
                is_jumping: has_round_started && rng.next_int(40) == 0,
                is_crouching: has_round_started && rng.next_int(24) == 0,
            },
            timer,
            has_round_started,
            is_round_over,
        });

        if is_round_over {
            break;
        }
    }
    out
}

/// Reads a JSON-lines snapshot trace. Blank lines and `#` comments are
/// skipped.
pub fn read_trace_jsonl(path: &Path) -> Result<Vec<GameStateSnapshot>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading trace {}", path.display()))?;
    let mut snapshots = Vec::new();
    for (line_no, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let snapshot: GameStateSnapshot = serde_json::from_str(trimmed)
            .with_context(|| format!("{}:{}: invalid snapshot", path.display(), line_no + 1))?;
        snapshots.push(snapshot);
    }
    if snapshots.is_empty() {
        return Err(anyhow!("trace {} had no snapshots", path.display()));
    }
    Ok(snapshots)
}

pub fn write_trace_jsonl(path: &Path, snapshots: &[GameStateSnapshot]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = String::new();
    for snapshot in snapshots {
        out.push_str(&serde_json::to_string(snapshot).context("failed to serialize snapshot")?);
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("failed writing {}", path.display()))
}
