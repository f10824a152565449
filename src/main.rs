//! cycletime — Analyze a piston test-rig CSV log: group measurement
//! channels and report detected cycle times.

use clap::Parser;
use std::path::PathBuf;

use cycletime::analysis::cycles::{
    extract_cycles, CycleAnalysis, CycleConfig, DEFAULT_MIN_GAP_S, DEFAULT_ORDER,
};
use cycletime::data::logger_csv::read_logger_file;
use cycletime::data::recording::RoleMap;
use cycletime::report::AnalysisReport;

#[derive(Parser)]
#[command(
    name = "cycletime",
    version,
    about = "Cycle-time analysis for piston test-rig CSV logs"
)]
struct Cli {
    /// Logger CSV file
    log: PathBuf,

    /// Extremum half-window, samples on each side
    #[arg(long, default_value_t = DEFAULT_ORDER)]
    order: usize,

    /// Minimum seconds between two distinct cycle starts
    #[arg(long, default_value_t = DEFAULT_MIN_GAP_S)]
    min_gap: f64,

    /// Position column driving cycle detection
    #[arg(long, default_value = "Pos/[cm]")]
    position: String,

    /// Skip cycle detection, only parse and summarize the file
    #[arg(long, default_value_t = false)]
    no_cycles: bool,

    /// Emit the report as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    log::info!("Loading {}", cli.log.display());
    let recording = read_logger_file(&cli.log, &RoleMap::default())?;
    log::info!(
        "{} samples, {} channels, {:.1} s of data",
        recording.num_samples(),
        recording.channels.len(),
        recording.duration_s()
    );

    let cycles = if cli.no_cycles {
        None
    } else {
        let config = CycleConfig {
            order: cli.order,
            min_gap_s: cli.min_gap,
        };
        match recording.series(&cli.position) {
            Some(series) => {
                let analysis = extract_cycles(&series, &config)?;
                for (n, duration) in analysis.durations_s.iter().enumerate() {
                    log::info!("cycle {}: {:.3} s", n + 1, duration);
                }
                Some(analysis)
            }
            None => {
                // No position channel in this file: nothing to detect,
                // still a valid run.
                log::warn!(
                    "column {:?} not found, skipping cycle detection",
                    cli.position
                );
                Some(CycleAnalysis::default())
            }
        }
    };

    let report = AnalysisReport::new(&recording, cycles);
    if cli.json {
        println!("{}", report.to_json());
    } else {
        print!("{}", report.to_text());
    }

    Ok(())
}
