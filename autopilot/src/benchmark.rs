use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use fighter_core::PlayerSide;

use crate::profiles::profile_ids;
use crate::runner::{run_profile, RunMetrics};
use crate::trace::synth_trace;
use crate::util::seed_to_hex;

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub profiles: Vec<String>,
    pub seeds: Vec<u32>,
    pub max_ticks: u32,
    pub out_dir: PathBuf,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub profile_id: String,
    pub seed: u32,
    pub seed_hex: String,
    pub ticks: u64,
    pub active_ticks: u64,
    pub direction_ticks: u64,
    pub attack_ticks: u64,
    pub macros_started: u64,
    pub macros_completed: u64,
    pub neutral_fallbacks: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileAggregate {
    pub profile_id: String,
    pub runs: usize,
    pub avg_ticks: f64,
    pub avg_active_ticks: f64,
    pub avg_macros_started: f64,
    pub avg_macros_completed: f64,
    pub avg_neutral_fallbacks: f64,
    pub macro_distribution: BTreeMap<String, u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub profiles: Vec<String>,
    pub seeds: Vec<u32>,
    pub max_ticks: u32,
    pub jobs: Option<usize>,
    pub run_count: usize,
    pub profile_summaries: Vec<ProfileAggregate>,
    pub runs: Vec<RunRecord>,
}

pub fn resolve_profiles(input: Option<&str>) -> Result<Vec<String>> {
    match input {
        None => Ok(profile_ids().iter().map(|id| (*id).to_string()).collect()),
        Some(raw) => {
            let mut profiles = Vec::new();
            for token in raw.split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                profiles.push(token.to_string());
            }
            if profiles.is_empty() {
                return Err(anyhow!("--profiles resolved to empty list"));
            }
            Ok(profiles)
        }
    }
}

/// Fans out profile x seed runs over synthetic traces, aggregates per
/// profile, and writes `summary.json` plus `runs.csv` to the output dir.
pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    if config.profiles.is_empty() {
        return Err(anyhow!("benchmark requires at least one profile"));
    }
    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
        }
    }
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    let run_jobs: Vec<(String, u32)> = config
        .profiles
        .iter()
        .flat_map(|profile| config.seeds.iter().map(move |seed| (profile.clone(), *seed)))
        .collect();

    let run_one = |(profile_id, seed): &(String, u32)| -> Result<RunMetrics> {
        let trace = synth_trace(*seed, config.max_ticks);
        let artifact = run_profile(profile_id, PlayerSide::One, *seed, &trace).with_context(
            || format!("benchmark run failed for profile={profile_id} seed={seed:#x}"),
        )?;
        Ok(artifact.metrics)
    };

    let run_results: Vec<Result<RunMetrics>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| run_jobs.par_iter().map(run_one).collect())
    } else {
        run_jobs.par_iter().map(run_one).collect()
    };

    let mut metrics = Vec::with_capacity(run_results.len());
    for result in run_results {
        metrics.push(result?);
    }

    let mut grouped: HashMap<String, Vec<&RunMetrics>> = HashMap::new();
    for run in &metrics {
        grouped.entry(run.profile_id.clone()).or_default().push(run);
    }

    let mut summaries = Vec::new();
    for (profile_id, runs) in grouped {
        let count = runs.len();
        let avg = |f: fn(&RunMetrics) -> u64| {
            runs.iter().map(|r| f(r) as f64).sum::<f64>() / count as f64
        };
        let mut distribution: BTreeMap<String, u64> = BTreeMap::new();
        for run in &runs {
            for (name, starts) in &run.starts_by_name {
                *distribution.entry(name.clone()).or_default() += starts;
            }
        }
        summaries.push(ProfileAggregate {
            profile_id,
            runs: count,
            avg_ticks: avg(|r| r.ticks),
            avg_active_ticks: avg(|r| r.active_ticks),
            avg_macros_started: avg(|r| r.macros_started),
            avg_macros_completed: avg(|r| r.macros_completed),
            avg_neutral_fallbacks: avg(|r| r.neutral_fallbacks),
            macro_distribution: distribution,
        });
    }
    summaries.sort_by(|a, b| {
        b.avg_active_ticks
            .total_cmp(&a.avg_active_ticks)
            .then_with(|| a.profile_id.cmp(&b.profile_id))
    });

    let run_records: Vec<RunRecord> = metrics
        .iter()
        .map(|run| RunRecord {
            profile_id: run.profile_id.clone(),
            seed: run.seed,
            seed_hex: seed_to_hex(run.seed),
            ticks: run.ticks,
            active_ticks: run.active_ticks,
            direction_ticks: run.direction_ticks,
            attack_ticks: run.attack_ticks,
            macros_started: run.macros_started,
            macros_completed: run.macros_completed,
            neutral_fallbacks: run.neutral_fallbacks,
        })
        .collect();

    write_runs_csv(&config.out_dir.join("runs.csv"), &run_records)?;

    let report = BenchmarkReport {
        profiles: config.profiles,
        seeds: config.seeds,
        max_ticks: config.max_ticks,
        jobs: config.jobs,
        run_count: run_records.len(),
        profile_summaries: summaries,
        runs: run_records,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary json")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    Ok(report)
}

fn write_runs_csv(path: &Path, rows: &[RunRecord]) -> Result<()> {
    let mut csv = String::from(
        "profile_id,seed_hex,seed,ticks,active_ticks,direction_ticks,attack_ticks,macros_started,macros_completed,neutral_fallbacks\n",
    );
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            row.profile_id,
            row.seed_hex,
            row.seed,
            row.ticks,
            row.active_ticks,
            row.direction_ticks,
            row.attack_ticks,
            row.macros_started,
            row.macros_completed,
            row.neutral_fallbacks
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}
