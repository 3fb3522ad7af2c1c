use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fight_autopilot::benchmark::{resolve_profiles, run_benchmark, BenchmarkConfig};
use fight_autopilot::profiles::describe_profiles;
use fight_autopilot::runner::{run_profile, write_commands_jsonl};
use fight_autopilot::trace::{read_trace_jsonl, synth_trace, write_trace_jsonl};
use fight_autopilot::util::{parse_seed, parse_seed_csv, seed_to_hex};
use fighter_core::{MacroLibrary, PlayerSide};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fight-autopilot")]
#[command(about = "Offline driver for the fighting-game controller core: macro inspection, trace runs, benchmarks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the built-in macro catalog
    ListMacros,
    /// Print a compiled macro's per-tick edges
    ShowMacro {
        #[arg(long)]
        name: String,
    },
    /// List available session profiles
    ListProfiles,
    /// Generate a deterministic synthetic snapshot trace
    SynthTrace {
        #[arg(long)]
        seed: String,
        #[arg(long, default_value_t = 3_600)]
        ticks: u32,
        #[arg(long)]
        output: PathBuf,
    },
    /// Run one profile over a snapshot trace and emit per-tick commands
    Run {
        #[arg(long)]
        profile: String,
        #[arg(long, value_enum, default_value_t = CliSide::One)]
        side: CliSide,
        #[arg(long)]
        seed: String,
        /// JSON-lines trace file; a synthetic trace is generated when omitted
        #[arg(long)]
        trace: Option<PathBuf>,
        #[arg(long, default_value_t = 3_600)]
        ticks: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run multi-seed benchmark across one or more profiles
    Benchmark {
        #[arg(long)]
        profiles: Option<String>,
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[arg(long, default_value_t = 3_600)]
        ticks: u32,
        #[arg(long, default_value = "benchmarks/latest")]
        out_dir: PathBuf,
        #[arg(long)]
        jobs: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliSide {
    One,
    Two,
}

impl From<CliSide> for PlayerSide {
    fn from(value: CliSide) -> Self {
        match value {
            CliSide::One => PlayerSide::One,
            CliSide::Two => PlayerSide::Two,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Cli { command } = Cli::parse();

    match command {
        Commands::ListMacros => {
            let library = MacroLibrary::builtin();
            for name in library.names() {
                let compiled = library.lookup(name)?;
                println!("{name:20} {} ticks", compiled.len());
            }
        }
        Commands::ShowMacro { name } => {
            let library = MacroLibrary::builtin();
            let compiled = library.lookup(&name)?;
            println!("name={}", compiled.name());
            println!("ticks={}", compiled.len());
            for (position, token) in compiled.encode().iter().enumerate() {
                println!("  {position:3}  {token}");
            }
        }
        Commands::ListProfiles => {
            for (id, description) in describe_profiles() {
                println!("{id:20} {description}");
            }
        }
        Commands::SynthTrace {
            seed,
            ticks,
            output,
        } => {
            let seed = parse_seed(&seed)?;
            let trace = synth_trace(seed, ticks);
            write_trace_jsonl(&output, &trace)?;
            println!("seed={}", seed_to_hex(seed));
            println!("snapshots={}", trace.len());
            println!("output={}", output.display());
        }
        Commands::Run {
            profile,
            side,
            seed,
            trace,
            ticks,
            output,
        } => {
            let seed = parse_seed(&seed)?;
            let snapshots = match trace {
                Some(path) => read_trace_jsonl(&path)?,
                None => synth_trace(seed, ticks),
            };
            let artifact = run_profile(&profile, side.into(), seed, &snapshots)?;

            if let Some(path) = output {
                write_commands_jsonl(&path, &artifact.commands)?;
                println!("output={}", path.display());
            }

            let metrics = &artifact.metrics;
            println!("profile={}", metrics.profile_id);
            println!("seed={}", seed_to_hex(metrics.seed));
            println!("ticks={}", metrics.ticks);
            println!("active_ticks={}", metrics.active_ticks);
            println!("direction_ticks={}", metrics.direction_ticks);
            println!("attack_ticks={}", metrics.attack_ticks);
            println!("macros_started={}", metrics.macros_started);
            println!("macros_completed={}", metrics.macros_completed);
            println!("macros_aborted={}", metrics.macros_aborted);
            println!("neutral_fallbacks={}", metrics.neutral_fallbacks);
            for (name, starts) in &metrics.starts_by_name {
                println!("macro={name} starts={starts}");
            }
        }
        Commands::Benchmark {
            profiles,
            seeds,
            seed_start,
            seed_count,
            ticks,
            out_dir,
            jobs,
        } => {
            let profiles = resolve_profiles(profiles.as_deref())?;
            let seeds = resolve_seeds(seeds.as_deref(), seed_start.as_deref(), seed_count)?;

            let report = run_benchmark(BenchmarkConfig {
                profiles,
                seeds,
                max_ticks: ticks,
                out_dir: out_dir.clone(),
                jobs,
            })?;

            println!("runs={}", report.run_count);
            println!(
                "jobs={}",
                report
                    .jobs
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("out_dir={}", out_dir.display());
            println!("profiles:");
            for summary in &report.profile_summaries {
                println!(
                    "  {}  runs={} avg_ticks={:.1} avg_active={:.1} avg_macros={:.1} avg_fallbacks={:.1}",
                    summary.profile_id,
                    summary.runs,
                    summary.avg_ticks,
                    summary.avg_active_ticks,
                    summary.avg_macros_started,
                    summary.avg_neutral_fallbacks,
                );
                for (name, starts) in &summary.macro_distribution {
                    println!("    {name:20} starts={starts}");
                }
            }
        }
    }

    Ok(())
}

fn resolve_seeds(seeds: Option<&str>, seed_start: Option<&str>, seed_count: u32) -> Result<Vec<u32>> {
    if let Some(csv) = seeds {
        return parse_seed_csv(csv);
    }
    if seed_count == 0 {
        return Err(anyhow!("--seed-count must be >= 1"));
    }

    let start = if let Some(start) = seed_start {
        parse_seed(start)?
    } else {
        0xA57E_0001
    };

    let mut out = Vec::with_capacity(seed_count as usize);
    let mut cur = start;
    for _ in 0..seed_count {
        out.push(cur);
        cur = cur.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    }
    Ok(out)
}
