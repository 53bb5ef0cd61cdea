mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use crate::input::manual::{FORM_DEFAULTS, manual_row};
use crate::input::table::load_table;
use crate::input::{DEFAULT_MAX_BYTES, DEFAULT_MAX_ROWS, UploadLimits};
use crate::model::features::N_FEATURES;
use crate::model::labels::BurnoutLabel;
use crate::model::state::{ArtifactPaths, ScorerState};
use crate::model::thresholds::{DecisionThreshold, MAX_GRID_POINTS, threshold_grid};
use crate::pipeline::stage4_aggregate::{distribution, run_stage4};
use crate::pipeline::stage5_evaluate::{ConfusionMatrix, run_stage5};
use crate::pipeline::stage6_report::{ReportPaths, Stage6Input, write_reports};
use crate::pipeline::{PipelineError, score_row, score_table};
use crate::report::json::render_prediction_json;
use crate::report::text::render_prediction_text;

const TOOL_NAME: &str = "burnout-scorer";

const EXIT_REQUEST_FAILED: i32 = 1;
const EXIT_CONFIG: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "burnout-scorer", version)]
#[command(about = "Scores employee burnout risk with a pre-trained gradient-boosted classifier")]
struct Cli {
    #[command(flatten)]
    artifacts: ArtifactArgs,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ArtifactArgs {
    /// XGBoost JSON model
    #[arg(long, global = true, default_value = "burnout_model.json")]
    model: PathBuf,
    /// Fitted scaler (mean/scale JSON)
    #[arg(long, global = true, default_value = "scaler.json")]
    scaler: PathBuf,
    /// Decision threshold file; 0.5 is used when it does not exist
    #[arg(long, global = true, default_value = "burnout_threshold.txt")]
    threshold_file: PathBuf,
    /// Decision threshold, overriding the threshold file
    #[arg(long, global = true)]
    threshold: Option<f32>,
}

impl ArtifactArgs {
    fn paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.model.clone(),
            scaler: self.scaler.clone(),
            threshold_file: self.threshold_file.clone(),
            threshold_override: self.threshold,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct TableArgs {
    /// Reject uploads with more data rows than this
    #[arg(long, default_value_t = DEFAULT_MAX_ROWS)]
    max_rows: usize,
    /// Reject uploads larger than this many (decompressed) bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BYTES)]
    max_bytes: u64,
    /// Field delimiter: a single ASCII character, or "tab"
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,
}

impl TableArgs {
    fn limits(&self) -> UploadLimits {
        UploadLimits {
            max_bytes: self.max_bytes,
            max_rows: self.max_rows,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score one employee from individually entered metrics
    Predict {
        #[arg(long, default_value_t = FORM_DEFAULTS[0])]
        work_hours_per_week: f64,
        #[arg(long, default_value_t = FORM_DEFAULTS[1])]
        after_hours_emails: f64,
        #[arg(long, default_value_t = FORM_DEFAULTS[2])]
        negative_sentiment_score: f64,
        #[arg(long, default_value_t = FORM_DEFAULTS[3])]
        meeting_count: f64,
        #[arg(long, default_value_t = FORM_DEFAULTS[4])]
        task_completion_rate: f64,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score uploaded CSV tables (.csv or .csv.gz) and write reports
    Batch {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory; one sub-directory per input when several are given
        #[arg(long, default_value = "burnout_out")]
        out: PathBuf,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Score a CSV once and relabel it across a range of thresholds
    Sweep {
        input: PathBuf,
        #[arg(long, default_value_t = 0.0)]
        start: f32,
        #[arg(long, default_value_t = 1.0)]
        stop: f32,
        #[arg(long, default_value_t = 0.1)]
        step: f32,
        #[command(flatten)]
        table: TableArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    std::process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let state = match ScorerState::load(&cli.artifacts.paths()) {
        Ok(state) => state,
        Err(err) => {
            error!("cannot start: {err}");
            eprintln!("error: {err}");
            return EXIT_CONFIG;
        }
    };

    match cli.command {
        Command::Predict {
            work_hours_per_week,
            after_hours_emails,
            negative_sentiment_score,
            meeting_count,
            task_completion_rate,
            json,
        } => {
            let values = [
                work_hours_per_week,
                after_hours_emails,
                negative_sentiment_score,
                meeting_count,
                task_completion_rate,
            ];
            match predict(&state, values, json) {
                Ok(text) => {
                    print!("{text}");
                    0
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    EXIT_REQUEST_FAILED
                }
            }
        }
        Command::Batch { inputs, out, table } => {
            if run_batch(&state, &inputs, &out, &table) > 0 {
                EXIT_REQUEST_FAILED
            } else {
                0
            }
        }
        Command::Sweep {
            input,
            start,
            stop,
            step,
            table,
        } => {
            let Some(grid) = threshold_grid(start, stop, step) else {
                eprintln!(
                    "error: invalid sweep range {start}..{stop} step {step}; thresholds must lie in [0, 1] with at most {MAX_GRID_POINTS} points"
                );
                return EXIT_REQUEST_FAILED;
            };
            match sweep(&state, &input, &grid, &table) {
                Ok(points) => {
                    print!("{}", render_sweep(&points));
                    0
                }
                Err(err) => {
                    eprintln!("error: {}: {err}", input.display());
                    EXIT_REQUEST_FAILED
                }
            }
        }
    }
}

fn predict(state: &ScorerState, values: [f64; N_FEATURES], json: bool) -> Result<String, String> {
    let row = manual_row(values).map_err(|e| e.to_string())?;
    let scored = score_row(state, row);
    info!(
        "individual prediction: p = {:.4}, label {}",
        scored.probability,
        scored.prediction.as_u8()
    );
    if json {
        let mut text =
            render_prediction_json(&scored, state.threshold()).map_err(|e| e.to_string())?;
        text.push('\n');
        Ok(text)
    } else {
        Ok(render_prediction_text(&scored, state.threshold()))
    }
}

/// Scores every upload in turn and returns how many failed.
fn run_batch(state: &ScorerState, inputs: &[PathBuf], out: &Path, table: &TableArgs) -> usize {
    let multiple = inputs.len() > 1;
    let mut taken = HashSet::new();
    let mut failed = 0usize;
    for path in inputs {
        let out_dir = claim_output_dir(resolve_output_dir(out, path, multiple), &mut taken);
        match process_upload(state, path, &out_dir, table) {
            Ok(summary) => println!("{}", summary.line()),
            Err(err) => {
                failed += 1;
                error!("{}: {err}", path.display());
                eprintln!("error: {}: {err}", path.display());
            }
        }
    }
    if failed > 0 {
        info!("{failed} of {} uploads failed", inputs.len());
    }
    failed
}

#[derive(Debug, Clone)]
struct UploadSummary {
    source: String,
    rows: usize,
    burnout: usize,
    percent: f64,
    paths: ReportPaths,
}

impl UploadSummary {
    fn line(&self) -> String {
        let out_dir = self
            .paths
            .summary
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        format!(
            "{}: {} rows, {} flagged as burnout ({:.1}%), reports in {}",
            self.source, self.rows, self.burnout, self.percent, out_dir
        )
    }
}

fn process_upload(
    state: &ScorerState,
    path: &Path,
    out_dir: &Path,
    opts: &TableArgs,
) -> Result<UploadSummary, PipelineError> {
    info!("scoring {}", path.display());
    let table = load_table(path, opts.delimiter, &opts.limits())?;
    let batch = score_table(state, &table)?;
    let aggregate = run_stage4(&batch.features, &batch.predictions);
    let evaluation = batch
        .ground_truth
        .as_deref()
        .map(|truth| run_stage5(truth, &batch.predictions));

    let paths = write_reports(
        &Stage6Input {
            table: &table,
            batch: &batch,
            aggregate: &aggregate,
            evaluation: evaluation.as_ref(),
            threshold_source: state.threshold_source().to_string(),
            tool_name: TOOL_NAME.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        out_dir,
    )?;

    let dist = aggregate.distribution;
    info!(
        "{}: scored {} rows, {} burnout",
        path.display(),
        dist.total,
        dist.count(BurnoutLabel::Burnout)
    );
    Ok(UploadSummary {
        source: table.source,
        rows: dist.total,
        burnout: dist.count(BurnoutLabel::Burnout),
        percent: dist.percent(BurnoutLabel::Burnout).unwrap_or(0.0),
        paths,
    })
}

#[derive(Debug, Clone, PartialEq)]
struct SweepPoint {
    threshold: f32,
    positives: usize,
    share: f64,
    precision: Option<f64>,
    recall: Option<f64>,
}

fn sweep(
    state: &ScorerState,
    path: &Path,
    grid: &[DecisionThreshold],
    opts: &TableArgs,
) -> Result<Vec<SweepPoint>, PipelineError> {
    let table = load_table(path, opts.delimiter, &opts.limits())?;
    let scored = score_table(state, &table)?;

    let points = grid
        .iter()
        .map(|&threshold| {
            let batch = scored.relabelled(threshold);
            let dist = distribution(&batch.predictions);
            let (precision, recall) = match &batch.ground_truth {
                Some(truth) => {
                    let m = ConfusionMatrix::from_labels(truth, &batch.predictions);
                    let tp = m.get(BurnoutLabel::Burnout, BurnoutLabel::Burnout) as f64;
                    (
                        Some(share(tp, m.predicted(BurnoutLabel::Burnout))),
                        Some(share(tp, m.support(BurnoutLabel::Burnout))),
                    )
                }
                None => (None, None),
            };
            SweepPoint {
                threshold: threshold.value(),
                positives: dist.count(BurnoutLabel::Burnout),
                share: dist.fraction(BurnoutLabel::Burnout).unwrap_or(0.0),
                precision,
                recall,
            }
        })
        .collect();
    Ok(points)
}

fn share(num: f64, denom: usize) -> f64 {
    if denom == 0 { 0.0 } else { num / denom as f64 }
}

fn render_sweep(points: &[SweepPoint]) -> String {
    let with_truth = points.iter().any(|p| p.precision.is_some());
    let mut out = format!("{:>9}  {:>9}  {:>7}", "threshold", "positives", "share");
    if with_truth {
        out.push_str(&format!("  {:>9}  {:>7}", "precision", "recall"));
    }
    out.push('\n');
    for p in points {
        out.push_str(&format!(
            "{:>9.3}  {:>9}  {:>7.4}",
            p.threshold, p.positives, p.share
        ));
        if let (Some(precision), Some(recall)) = (p.precision, p.recall) {
            out.push_str(&format!("  {:>9.4}  {:>7.4}", precision, recall));
        }
        out.push('\n');
    }
    out
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match raw.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!(
                "delimiter must be a single ASCII character or \"tab\", got {raw:?}"
            )),
        },
    }
}

/// With several inputs each one gets its own sub-directory named after the file.
fn resolve_output_dir(base: &Path, input: &Path, multiple: bool) -> PathBuf {
    if !multiple {
        return base.to_path_buf();
    }
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let stem = name.strip_suffix(".gz").unwrap_or(&name);
    let stem = stem.strip_suffix(".csv").unwrap_or(stem);
    base.join(stem)
}

/// Suffixes `-2`, `-3`, ... until the directory is not used by an earlier upload.
fn claim_output_dir(dir: PathBuf, taken: &mut HashSet<PathBuf>) -> PathBuf {
    if taken.insert(dir.clone()) {
        return dir;
    }
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let mut n = 2usize;
    loop {
        let candidate = dir.with_file_name(format!("{name}-{n}"));
        if taken.insert(candidate.clone()) {
            warn!(
                "output directory {} already used in this batch, writing to {}",
                dir.display(),
                candidate.display()
            );
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
