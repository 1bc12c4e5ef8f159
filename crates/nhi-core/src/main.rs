//! Nursing-home inspection timing CLI
//!
//! The main entry point for nhi-core, handling:
//! - Mechanism evaluation (hazard → time share → average effort)
//! - Hazard-to-time-share conversion
//! - Policy outcome lookups, interpolation, and scenario listings
//! - Seeded week sampling
//! - Model configuration inspection

use clap::{Args, CommandFactory, Parser, Subcommand};
use nhi_common::{format_error_human, Error, OutputFormat, StructuredError, SCHEMA_VERSION};
use nhi_config::{ModelConfig, CONFIG_SCHEMA_VERSION};
use nhi_core::config::{load_config, ConfigError, ConfigOptions, ResolvedConfig};
use nhi_core::exit_codes::ExitCode;
use nhi_core::log_event;
use nhi_core::logging::{
    event_names, generate_run_id, get_host_id, init_logging, LogConfig, LogContext, LogFormat,
    Stage,
};
use nhi_core::mechanism::{MechanismModel, MechanismOutcome, Predictability};
use nhi_core::outcomes::{
    interpolate, total_inspections, Interpolation, Metric, OutcomeTable, DEFAULT_TABLE_FILE,
    ENV_OUTCOMES_TABLE,
};
use nhi_core::sampling::{draw_samples, RegimeSample, SampleOptions, SampleReport};
use nhi_math::{
    calibrate_hazard, expected_cycle_length_from_hazard, survival_from_hazard, time_share_from_hazard,
};
use serde_json::Value;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Nursing-home inspection timing toolkit
#[derive(Parser)]
#[command(name = "nhi-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Override config directory (reads <dir>/model.json)
    #[arg(long, global = true, env = "NHI_CONFIG_DIR")]
    config: Option<PathBuf>,

    /// Explicit model file
    #[arg(long, global = true, env = "NHI_MODEL")]
    model: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human or jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the mechanism model at one predictability
    Mechanism(MechanismArgs),

    /// Convert a weekly hazard into survival and time share
    TimeShare(TimeShareArgs),

    /// Query the policy outcome table
    Outcomes(OutcomesArgs),

    /// Sample weeks since inspection and the implied effort
    Sample(SampleArgs),

    /// Inspect or validate the model configuration
    Config(ConfigArgs),

    /// Print version information
    Version,
}

/// Predictability selection shared by several commands.
#[derive(Args, Debug, Clone, Copy)]
struct PredictabilityArg {
    /// Predictability, 0 = perfectly predictable, 100 = fully random
    #[arg(long, short = 'p', default_value_t = 50)]
    predictability: u8,

    /// Read --predictability on the reversed scale (0 = fully random)
    #[arg(long)]
    ui_scale: bool,
}

impl PredictabilityArg {
    fn resolve(self) -> Result<Predictability, Error> {
        if self.ui_scale {
            Predictability::from_ui_scale(self.predictability)
        } else {
            Predictability::new(self.predictability)
        }
    }
}

#[derive(Args, Debug)]
struct MechanismArgs {
    #[command(flatten)]
    predictability: PredictabilityArg,

    /// Weeks of each series to print (defaults to cycle.display_weeks)
    #[arg(long)]
    weeks: Option<usize>,
}

#[derive(Args, Debug)]
struct TimeShareArgs {
    /// Comma-separated weekly hazard
    #[arg(
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        conflicts_with = "shape",
        required_unless_present = "shape"
    )]
    hazard: Option<Vec<f64>>,

    /// Comma-separated hazard shape to rescale to --target
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, requires = "target")]
    shape: Option<Vec<f64>>,

    /// Target expected cycle length in weeks
    #[arg(long, requires = "shape")]
    target: Option<f64>,

    /// Weeks summed when building survival (defaults to cycle.horizon)
    #[arg(long)]
    horizon: Option<usize>,
}

#[derive(Args, Debug)]
struct OutcomesArgs {
    /// Outcome table CSV
    #[arg(long, global = true, env = ENV_OUTCOMES_TABLE)]
    table: Option<PathBuf>,

    #[command(subcommand)]
    command: OutcomesCommands,
}

#[derive(Subcommand, Debug)]
enum OutcomesCommands {
    /// Exact scenario row
    Lookup {
        #[command(flatten)]
        predictability: PredictabilityArg,

        /// Inspections per facility per year
        #[arg(long)]
        frequency: f64,
    },
    /// Interpolated outcomes between scenarios
    Interpolate {
        #[command(flatten)]
        predictability: PredictabilityArg,

        /// Inspections per facility per year
        #[arg(long)]
        frequency: f64,

        /// Single metric (defaults to all)
        #[arg(long, value_enum)]
        metric: Option<Metric>,
    },
    /// All scenarios with labels and chart limits
    Scenarios,
}

#[derive(Args, Debug)]
struct SampleArgs {
    #[command(flatten)]
    predictability: PredictabilityArg,

    /// Random seed (defaults to sampling.seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Dots per regime (defaults to sampling.dots_per_regime)
    #[arg(long)]
    count: Option<usize>,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective model configuration
    Show,
    /// Validate a model file or config directory
    Validate {
        /// model.json file or a directory containing one
        path: Option<PathBuf>,
    },
    /// Print the JSON schema of model.json
    Schema,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = e.print();
            std::process::exit(code.as_i32());
        }
    };

    let log_level = LogConfig::level_from_verbosity(cli.global.verbose, cli.global.quiet);
    let log_config = LogConfig::from_env(log_level, cli.global.log_format);
    init_logging(&log_config);

    let exit_code = match cli.command {
        None => {
            let _ = Cli::command().print_help();
            ExitCode::Clean
        }
        Some(Commands::Mechanism(args)) => run_mechanism(&cli.global, &args),
        Some(Commands::TimeShare(args)) => run_time_share(&cli.global, &args),
        Some(Commands::Outcomes(args)) => run_outcomes(&cli.global, &args),
        Some(Commands::Sample(args)) => run_sample(&cli.global, &args),
        Some(Commands::Config(args)) => run_config(&cli.global, &args),
        Some(Commands::Version) => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Shared helpers
// ============================================================================

fn command_context(command: &str) -> LogContext {
    LogContext::new(generate_run_id(), get_host_id()).with_command(command)
}

/// Standard payload header merged with the command body.
fn envelope(ctx: &LogContext, body: Value) -> Value {
    let mut payload = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "run_id": ctx.run_id,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "command": ctx.command,
    });
    if let (Some(out), Value::Object(fields)) = (payload.as_object_mut(), body) {
        out.extend(fields);
    }
    payload
}

fn emit_json(payload: &Value) -> ExitCode {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::Clean
        }
        Err(e) => {
            eprintln!("failed to serialize output: {}", e);
            ExitCode::InternalError
        }
    }
}

/// Report an error on stderr in the selected format.
fn output_error(global: &GlobalOpts, ctx: &LogContext, error: &Error) -> ExitCode {
    let exit_code = ExitCode::for_error(error);
    if exit_code.is_internal_error() {
        log_event!(
            ctx,
            ERROR,
            event_names::INTERNAL_ERROR,
            Stage::Render,
            "Command failed",
            code = error.code()
        );
    }

    let structured = StructuredError::from(error);
    match global.format {
        OutputFormat::Json => {
            let response = envelope(
                ctx,
                serde_json::json!({
                    "status": "error",
                    "exit_code": exit_code.code_name(),
                    "error": structured,
                }),
            );
            let text =
                serde_json::to_string_pretty(&response).unwrap_or_else(|_| structured.to_json());
            eprintln!("{}", text);
        }
        OutputFormat::Summary => {
            eprintln!("[{}] error: {}", ctx.run_id, error);
        }
        OutputFormat::Md => {
            eprintln!("{}", format_error_human(error, std::io::stderr().is_terminal()));
        }
    }

    exit_code
}

fn output_config_error(global: &GlobalOpts, ctx: &LogContext, error: ConfigError) -> ExitCode {
    let message = error.to_string();
    log_event!(
        ctx,
        ERROR,
        event_names::CONFIG_ERROR,
        Stage::Config,
        "Model configuration rejected",
        reason = message.as_str()
    );
    output_error(global, ctx, &Error::from(error))
}

fn load_model(
    global: &GlobalOpts,
    ctx: &LogContext,
    options: &ConfigOptions,
) -> Result<ResolvedConfig, ExitCode> {
    match load_config(options) {
        Ok(config) => {
            if config.using_defaults() {
                log_event!(
                    ctx,
                    DEBUG,
                    event_names::CONFIG_DEFAULT_USED,
                    Stage::Config,
                    "No model file found, using built-in defaults"
                );
            } else {
                let path = config
                    .paths
                    .model
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                let source = config.paths.model_source.to_string();
                log_event!(
                    ctx,
                    INFO,
                    event_names::CONFIG_LOADED,
                    Stage::Config,
                    "Loaded model configuration",
                    path = path.as_str(),
                    source = source.as_str()
                );
            }
            Ok(config)
        }
        Err(e) => Err(output_config_error(global, ctx, e)),
    }
}

fn global_config_options(global: &GlobalOpts) -> ConfigOptions {
    ConfigOptions {
        config_dir: global.config.clone(),
        model_path: global.model.clone(),
    }
}

fn fmt_gain(gain: Option<f64>) -> String {
    gain.map(|g| format!("{:+.1}%", g))
        .unwrap_or_else(|| "n/a".to_string())
}

// ============================================================================
// mechanism
// ============================================================================

fn run_mechanism(global: &GlobalOpts, args: &MechanismArgs) -> ExitCode {
    let ctx = command_context("mechanism");
    log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "Starting mechanism command");

    let config = match load_model(global, &ctx, &global_config_options(global)) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let p = match args.predictability.resolve() {
        Ok(p) => p,
        Err(e) => return output_error(global, &ctx, &e),
    };

    let model = MechanismModel::new(config.model.clone());
    let outcome = model.evaluate(p);
    log_event!(
        ctx,
        DEBUG,
        event_names::MECHANISM_CALIBRATED,
        Stage::Mechanism,
        "Calibrated blended hazard",
        predictability = p.value(),
        multiplier = outcome.calibration_multiplier,
        converged = outcome.calibration_converged,
        expected_cycle_length = outcome.profile.expected_cycle_length
    );
    if outcome.calibration_fallback {
        log_event!(
            ctx,
            WARN,
            event_names::MECHANISM_FALLBACK,
            Stage::Mechanism,
            "Hazard shape was degenerate, fell back to a flat hazard",
            predictability = p.value()
        );
    }
    if !outcome.profile.average_effort.is_finite() {
        let err = Error::NumericalInstability(format!(
            "average effort is not finite at predictability={}",
            p
        ));
        return output_error(global, &ctx, &err);
    }

    let weeks = args.weeks.unwrap_or(config.model.cycle.display_weeks);
    let shown = outcome.truncated(weeks);
    let snapshot = config.snapshot();

    let code = match global.format {
        OutputFormat::Json => emit_json(&envelope(
            &ctx,
            serde_json::json!({
                "config": {
                    "source": snapshot.model_source,
                    "path": snapshot.model_path,
                    "effective_hash": snapshot.effective_hash,
                },
                "ui_scale": p.ui_scale(),
                "weeks": weeks,
                "outcome": shown,
            }),
        )),
        OutputFormat::Summary => {
            println!(
                "[{}] mechanism: p={} regime={} avg_effort={:.4} random={:.4} gain={} cycle={:.2}w",
                ctx.run_id,
                p,
                outcome.regime.label().to_lowercase(),
                outcome.profile.average_effort,
                outcome.benchmark.average_effort,
                fmt_gain(outcome.effort_gain_percent),
                outcome.profile.expected_cycle_length
            );
            ExitCode::Clean
        }
        OutputFormat::Md => {
            print_mechanism_md(&shown, config.model.cycle.cycle_weeks);
            ExitCode::Clean
        }
    };

    log_event!(ctx, INFO, event_names::RUN_FINISHED, Stage::Render, "Mechanism command finished");
    code
}

fn print_mechanism_md(outcome: &MechanismOutcome, cycle_weeks: u32) {
    let profile = &outcome.profile;
    println!("# Mechanism: predictability {}", outcome.predictability);
    println!();
    println!("| | Selected ({}) | Fully random |", outcome.regime);
    println!("|---|---:|---:|");
    println!(
        "| Average effort | {:.4} | {:.4} |",
        profile.average_effort, outcome.benchmark.average_effort
    );
    println!(
        "| Expected cycle (weeks) | {:.2} | {:.2} |",
        profile.expected_cycle_length, outcome.benchmark.expected_cycle_length
    );
    println!(
        "| Time within {} weeks of inspection | {:.1}% | {:.1}% |",
        outcome.revisit_weeks,
        profile.revisit_time_share * 100.0,
        outcome.benchmark.revisit_time_share * 100.0
    );
    println!();
    println!(
        "Randomizing timing changes average effort by {} (target cycle {} weeks).",
        fmt_gain(outcome.effort_gain_percent),
        cycle_weeks
    );
    println!();
    println!("## Weekly series");
    println!();
    println!("| Week | Hazard | Time share | Effort |");
    println!("|---:|---:|---:|---:|");
    for (w, ((h, pi), e)) in profile
        .hazard
        .iter()
        .zip(&profile.time_share)
        .zip(&profile.effort)
        .enumerate()
    {
        println!("| {} | {:.4} | {:.5} | {:.4} |", w, h, pi, e);
    }
}

// ============================================================================
// time-share
// ============================================================================

fn run_time_share(global: &GlobalOpts, args: &TimeShareArgs) -> ExitCode {
    let ctx = command_context("time-share");
    log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "Starting time-share command");

    let config = match load_model(global, &ctx, &global_config_options(global)) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let horizon = args.horizon.unwrap_or(config.model.cycle.horizon);
    if horizon == 0 {
        let err = Error::InvalidInput("horizon must be > 0".to_string());
        return output_error(global, &ctx, &err);
    }

    let (hazard, calibration) = match (&args.hazard, &args.shape, args.target) {
        (Some(hazard), _, _) => (hazard.clone(), None),
        (None, Some(shape), Some(target)) => {
            if !target.is_finite() || target < 1.0 {
                let err = Error::InvalidInput(format!(
                    "target cycle length must be >= 1 week, got {}",
                    target
                ));
                return output_error(global, &ctx, &err);
            }
            let cal = calibrate_hazard(&[], shape, target, horizon);
            if cal.fallback {
                log_event!(
                    ctx,
                    WARN,
                    event_names::MECHANISM_FALLBACK,
                    Stage::Mechanism,
                    "Hazard shape was degenerate, fell back to a flat hazard"
                );
            }
            if !cal.converged {
                log_event!(
                    ctx,
                    WARN,
                    event_names::MECHANISM_UNREACHABLE,
                    Stage::Mechanism,
                    "Target cycle length is out of reach for this shape",
                    target = target,
                    expected_cycle_length = cal.expected_length
                );
            }
            (cal.hazard.clone(), Some(cal))
        }
        _ => {
            let err = Error::InvalidInput("pass --hazard, or --shape with --target".to_string());
            return output_error(global, &ctx, &err);
        }
    };

    let survival = survival_from_hazard(&hazard, horizon);
    let time_share = time_share_from_hazard(&hazard, horizon);
    let expected_cycle_length = expected_cycle_length_from_hazard(&hazard, horizon);

    match global.format {
        OutputFormat::Json => emit_json(&envelope(
            &ctx,
            serde_json::json!({
                "horizon": horizon,
                "expected_cycle_length": expected_cycle_length,
                "calibration": calibration.as_ref().map(|c| serde_json::json!({
                    "multiplier": c.multiplier,
                    "iterations": c.iterations,
                    "fallback": c.fallback,
                    "converged": c.converged,
                })),
                "hazard": hazard,
                "survival": survival,
                "time_share": time_share,
            }),
        )),
        OutputFormat::Summary => {
            println!(
                "[{}] time-share: weeks={} expected_cycle={:.3}w",
                ctx.run_id,
                time_share.len(),
                expected_cycle_length
            );
            ExitCode::Clean
        }
        OutputFormat::Md => {
            println!("# Time share");
            println!();
            println!("Expected cycle length: {:.3} weeks", expected_cycle_length);
            if let Some(cal) = &calibration {
                println!("Calibration multiplier: {:.6}", cal.multiplier);
            }
            println!();
            println!("| Week | Survival | Time share |");
            println!("|---:|---:|---:|");
            for (w, (s, pi)) in survival.iter().zip(&time_share).enumerate() {
                println!("| {} | {:.6} | {:.6} |", w, s, pi);
            }
            ExitCode::Clean
        }
    }
}

// ============================================================================
// outcomes
// ============================================================================

fn resolve_table_path(arg: Option<&Path>, model: &ModelConfig) -> PathBuf {
    arg.map(Path::to_path_buf)
        .or_else(|| model.outcomes.table_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TABLE_FILE))
}

fn run_outcomes(global: &GlobalOpts, args: &OutcomesArgs) -> ExitCode {
    let ctx = command_context("outcomes");
    log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "Starting outcomes command");

    let config = match load_model(global, &ctx, &global_config_options(global)) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let path = resolve_table_path(args.table.as_deref(), &config.model);
    let table = match OutcomeTable::from_path(&path, &config.model.outcomes) {
        Ok(t) => t,
        Err(e) => return output_error(global, &ctx, &e.into()),
    };
    let path_text = path.display().to_string();
    log_event!(
        ctx,
        INFO,
        event_names::OUTCOMES_LOADED,
        Stage::Outcomes,
        "Loaded outcome table",
        path = path_text.as_str(),
        rows = table.len()
    );

    let result = match &args.command {
        OutcomesCommands::Lookup {
            predictability,
            frequency,
        } => outcomes_lookup(global, &ctx, &table, &path_text, *predictability, *frequency),
        OutcomesCommands::Interpolate {
            predictability,
            frequency,
            metric,
        } => outcomes_interpolate(global, &ctx, &table, *predictability, *frequency, *metric),
        OutcomesCommands::Scenarios => outcomes_scenarios(global, &ctx, &table, &path_text),
    };

    match result {
        Ok(code) => code,
        Err(e) => output_error(global, &ctx, &e),
    }
}

fn outcomes_lookup(
    global: &GlobalOpts,
    ctx: &LogContext,
    table: &OutcomeTable,
    path: &str,
    predictability: PredictabilityArg,
    frequency: f64,
) -> Result<ExitCode, Error> {
    let p = predictability.resolve()?;
    let row = match table.lookup(p, frequency) {
        Ok(row) => row,
        Err(e) => {
            log_event!(
                ctx,
                WARN,
                event_names::OUTCOMES_LOOKUP_MISS,
                Stage::Outcomes,
                "No outcome row for requested scenario",
                predictability = p.value(),
                frequency = frequency
            );
            return Err(e.into());
        }
    };
    let scenario = table.scenarios()?.into_iter().find(|s| s.row == *row);
    let tiers = table.frequency_tiers(p)?;

    Ok(match global.format {
        OutputFormat::Json => emit_json(&envelope(
            ctx,
            serde_json::json!({
                "table": path,
                "scenario": scenario,
                "frequency_tiers": tiers,
            }),
        )),
        OutputFormat::Summary => {
            let label = scenario.as_ref().map(|s| s.label.as_str()).unwrap_or("");
            println!(
                "[{}] outcomes: {} lives_saved={:.1} per_1000={:.1} info={:.1}% inspections={}",
                ctx.run_id,
                label,
                row.lives_saved_annually,
                row.lives_saved_per_1000,
                row.info_percent,
                total_inspections(row.frequency, table.params().facilities)
            );
            ExitCode::Clean
        }
        OutputFormat::Md => {
            let label = scenario.as_ref().map(|s| s.label.as_str()).unwrap_or("Scenario");
            println!("# {}", label);
            println!();
            println!("| Metric | Value |");
            println!("|---|---:|");
            for metric in Metric::ALL {
                println!(
                    "| {} | {:.1} |",
                    metric.title(),
                    row.value(metric, table.params().facilities)
                );
            }
            ExitCode::Clean
        }
    })
}

fn outcomes_interpolate(
    global: &GlobalOpts,
    ctx: &LogContext,
    table: &OutcomeTable,
    predictability: PredictabilityArg,
    frequency: f64,
    metric: Option<Metric>,
) -> Result<ExitCode, Error> {
    let p = predictability.resolve()?;
    if !frequency.is_finite() || frequency < 0.0 {
        return Err(Error::InvalidInput(format!(
            "frequency must be a non-negative number, got {}",
            frequency
        )));
    }

    let metrics = metric.map(|m| vec![m]).unwrap_or_else(|| Metric::ALL.to_vec());
    let mut results: Vec<Interpolation> = Vec::with_capacity(metrics.len());
    for m in metrics {
        results.push(interpolate(table, frequency, p, m)?);
    }
    let snapped = results
        .first()
        .map(|r| r.anchors.iter().filter(|a| a.snapped).count())
        .unwrap_or(0);
    if snapped > 0 {
        log_event!(
            ctx,
            DEBUG,
            event_names::OUTCOMES_BASELINE_SNAP,
            Stage::Outcomes,
            "Frequency snapped to baseline rows",
            regimes = snapped
        );
    }

    Ok(match global.format {
        OutputFormat::Json => emit_json(&envelope(
            ctx,
            serde_json::json!({
                "predictability": p,
                "regime": p.regime(),
                "frequency": frequency,
                "total_inspections": total_inspections(frequency, table.params().facilities),
                "results": results,
            }),
        )),
        OutputFormat::Summary => {
            let parts: Vec<String> = results
                .iter()
                .map(|r| format!("{}={:.1}", r.metric, r.value))
                .collect();
            println!(
                "[{}] interpolate: p={} f={} {}",
                ctx.run_id,
                p,
                frequency,
                parts.join(" ")
            );
            ExitCode::Clean
        }
        OutputFormat::Md => {
            println!("# Interpolated outcomes (p={}, frequency={})", p, frequency);
            println!();
            println!("| Metric | Value | Scheduled | Current | Unpredictable |");
            println!("|---|---:|---:|---:|---:|");
            for r in &results {
                let [a, b, c] = r.anchors;
                println!(
                    "| {} | {:.1} | {:.1} | {:.1} | {:.1} |",
                    r.metric.title(),
                    r.value,
                    a.value,
                    b.value,
                    c.value
                );
            }
            ExitCode::Clean
        }
    })
}

fn outcomes_scenarios(
    global: &GlobalOpts,
    ctx: &LogContext,
    table: &OutcomeTable,
    path: &str,
) -> Result<ExitCode, Error> {
    let scenarios = table.scenarios()?;
    let limits = table.axis_limits();

    Ok(match global.format {
        OutputFormat::Json => emit_json(&envelope(
            ctx,
            serde_json::json!({
                "table": path,
                "facilities": table.params().facilities,
                "scenarios": scenarios,
                "axis_limits": limits,
            }),
        )),
        OutputFormat::Summary => {
            println!("[{}] outcomes: {} scenarios from {}", ctx.run_id, scenarios.len(), path);
            ExitCode::Clean
        }
        OutputFormat::Md => {
            println!("# Policy scenarios");
            println!();
            println!("| Scenario | Frequency | Lives saved | Per 1,000 | Information | Inspections |");
            println!("|---|---:|---:|---:|---:|---:|");
            for s in &scenarios {
                println!(
                    "| {} | {} | {:.1} | {:.1} | {:.1}% | {} |",
                    s.label,
                    s.row.frequency,
                    s.row.lives_saved_annually,
                    s.row.lives_saved_per_1000,
                    s.row.info_percent,
                    s.total_inspections
                );
            }
            ExitCode::Clean
        }
    })
}

// ============================================================================
// sample
// ============================================================================

fn run_sample(global: &GlobalOpts, args: &SampleArgs) -> ExitCode {
    let ctx = command_context("sample");
    log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "Starting sample command");

    let config = match load_model(global, &ctx, &global_config_options(global)) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let p = match args.predictability.resolve() {
        Ok(p) => p,
        Err(e) => return output_error(global, &ctx, &e),
    };

    let mut options = SampleOptions::from(&config.model.sampling);
    if let Some(seed) = args.seed {
        options.seed = seed;
    }
    if let Some(count) = args.count {
        if count == 0 {
            let err = Error::InvalidInput("count must be > 0".to_string());
            return output_error(global, &ctx, &err);
        }
        options.dots = count;
    }

    let model = MechanismModel::new(config.model.clone());
    let report = draw_samples(&model, p, &options);
    log_event!(
        ctx,
        INFO,
        event_names::SAMPLE_DRAWN,
        Stage::Sample,
        "Sampled weeks for selected and random regimes",
        seed = options.seed,
        dots = options.dots
    );

    match global.format {
        OutputFormat::Json => emit_json(&envelope(&ctx, serde_json::json!({ "sample": report }))),
        OutputFormat::Summary => {
            println!(
                "[{}] sample: seed={} p={} mean_effort={:.4} random_mean_effort={:.4}",
                ctx.run_id,
                report.seed,
                p,
                report.selected.sample_mean_effort,
                report.random.sample_mean_effort
            );
            ExitCode::Clean
        }
        OutputFormat::Md => {
            print_sample_md(&report, options.columns);
            ExitCode::Clean
        }
    }
}

fn print_sample_md(report: &SampleReport, columns: usize) {
    println!("# What a typical year looks like (seed {})", report.seed);
    println!();
    println!(
        "Effort levels: Low <= {:.4} < Medium <= {:.4} < High",
        report.bins.low_cut, report.bins.high_cut
    );
    for (title, sample) in [
        ("Selected regime", &report.selected),
        ("Fully random", &report.random),
    ] {
        println!();
        println!("## {} (predictability {})", title, sample.predictability);
        println!();
        println!(
            "Average effort: {:.4} (sampled {:.4})",
            sample.average_effort, sample.sample_mean_effort
        );
        println!();
        println!("```");
        for line in dot_rows(sample, columns) {
            println!("{}", line);
        }
        println!("```");
    }
}

/// Dot grid as text, top row first, one letter per level.
fn dot_rows(sample: &RegimeSample, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let rows = sample.dots.len().div_ceil(columns);
    let mut grid = vec![vec![' '; columns]; rows];
    for dot in &sample.dots {
        let row = rows.saturating_sub(1).saturating_sub(dot.y);
        if let Some(cell) = grid.get_mut(row).and_then(|r| r.get_mut(dot.x)) {
            *cell = dot.level.label().chars().next().unwrap_or('?');
        }
    }
    grid.into_iter()
        .map(|r| {
            r.into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
                .join(" ")
                .trim_end()
                .to_string()
        })
        .collect()
}

// ============================================================================
// config
// ============================================================================

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> ExitCode {
    match &args.command {
        ConfigCommands::Show => run_config_show(global),
        ConfigCommands::Validate { path } => run_config_validate(global, path.as_deref()),
        ConfigCommands::Schema => run_config_schema(global),
    }
}

/// Display the effective configuration (defaults if no file is present).
fn run_config_show(global: &GlobalOpts) -> ExitCode {
    let ctx = command_context("config show");
    let config = match load_model(global, &ctx, &global_config_options(global)) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let snapshot = config.snapshot();

    match global.format {
        OutputFormat::Json => emit_json(&envelope(
            &ctx,
            serde_json::json!({
                "source": {
                    "kind": snapshot.model_source,
                    "path": snapshot.model_path,
                    "hash": snapshot.model_hash,
                    "using_defaults": config.using_defaults(),
                    "schema_version": snapshot.schema_version,
                },
                "effective_hash": snapshot.effective_hash,
                "summary": snapshot.summary,
                "model": config.model,
            }),
        )),
        OutputFormat::Summary => {
            let source = snapshot
                .model_path
                .clone()
                .unwrap_or_else(|| "built-in defaults".to_string());
            println!(
                "[{}] config: model={} hash={}",
                ctx.run_id,
                source,
                snapshot.short_id()
            );
            ExitCode::Clean
        }
        OutputFormat::Md => {
            println!("# nhi-core config show");
            println!();
            match &snapshot.model_path {
                Some(path) => {
                    println!("Source: {} ({})", path, snapshot.model_source);
                    println!("Hash: {}", snapshot.model_hash.as_deref().unwrap_or("n/a"));
                }
                None => println!("Source: **built-in defaults** (no model.json found)"),
            }
            println!("Schema version: {}", snapshot.schema_version);
            println!();
            let s = &snapshot.summary;
            println!("| Setting | Value |");
            println!("|---|---|");
            println!("| Cycle weeks | {} |", s.cycle_weeks);
            println!("| Horizon | {} |", s.horizon);
            println!("| Scheduled hazard | {} |", s.scheduled_hazard);
            println!("| Scheduled effort | {} |", s.scheduled_effort);
            println!("| Unpredictable effort | {} |", s.unpredictable_effort);
            println!("| Seed | {} |", s.seed);
            ExitCode::Clean
        }
    }
}

/// Validate a model file, a config directory, or the resolved model.
fn run_config_validate(global: &GlobalOpts, path: Option<&Path>) -> ExitCode {
    let ctx = command_context("config validate");
    let options = match path {
        Some(p) if p.is_dir() => ConfigOptions {
            config_dir: Some(p.to_path_buf()),
            model_path: None,
        },
        Some(p) => ConfigOptions {
            config_dir: None,
            model_path: Some(p.to_path_buf()),
        },
        None => global_config_options(global),
    };

    let config = match load_model(global, &ctx, &options) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let snapshot = config.snapshot();

    match global.format {
        OutputFormat::Json => emit_json(&envelope(
            &ctx,
            serde_json::json!({
                "status": "valid",
                "path": snapshot.model_path,
                "using_defaults": config.using_defaults(),
                "schema_version": snapshot.schema_version,
            }),
        )),
        OutputFormat::Summary => {
            println!("[{}] config validate: OK", ctx.run_id);
            ExitCode::Clean
        }
        OutputFormat::Md => {
            println!("# Configuration Validation");
            println!();
            println!("Status: ✓ Valid");
            match &snapshot.model_path {
                Some(p) => println!("Model: {}", p),
                None => println!("Model: using built-in defaults"),
            }
            ExitCode::Clean
        }
    }
}

fn run_config_schema(global: &GlobalOpts) -> ExitCode {
    let ctx = command_context("config schema");
    let schema = schemars::schema_for!(ModelConfig);
    match global.format {
        OutputFormat::Summary => {
            println!("[{}] config schema: model.json v{}", ctx.run_id, CONFIG_SCHEMA_VERSION);
            ExitCode::Clean
        }
        // The schema is JSON whatever the format.
        OutputFormat::Json | OutputFormat::Md => match serde_json::to_value(&schema) {
            Ok(value) => emit_json(&value),
            Err(e) => output_error(global, &ctx, &Error::Json(e)),
        },
    }
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "config_schema_version": CONFIG_SCHEMA_VERSION,
        "nhi_core_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json => {
            emit_json(&version_info);
        }
        _ => {
            println!("nhi-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}
