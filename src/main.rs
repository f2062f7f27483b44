//! raggate - CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use raggate::{
    cli::{
        AblateArgs, AskArgs, Cli, Commands, EvalArgs, EvalConfig, GateCommand, IngestArgs,
        MonitorArgs, ReliabilityArgs,
    },
    dataset::load_dataset,
    eval::{AblationPlan, AblationRunner, EvalMode, EvaluationRunner, ReliabilityRunner},
    gates::{self, AnswerClassifier, GateReport},
    judge::Judge,
    llm::OpenAiClient,
    monitoring::{
        check_alerts, compute_drift_score, load_baseline, make_metric, read_metrics_log,
        summarize_metrics, MetricInput, MetricsConfig, MetricsLogger,
    },
    rag::{
        distances, ingest::ingest_pdf_dir, AnswerGenerator, PdfIndexBuilder, QdrantStore,
        RagPipeline,
    },
};

/// Process outcome for a command that completed without a fatal error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Pass,
    Fail,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let outcome = run(cli).await;
    if let Err(err) = &outcome {
        let lines = error_lines(err);
        if let Some((first, causes)) = lines.split_first() {
            error!(error = %first, "command failed");
            for cause in causes {
                error!(cause = %cause, "caused by");
            }
        }
    }
    ExitCode::from(exit_status(&outcome))
}

/// 0 pass, 1 threshold violation, 2 fatal error
fn exit_status(outcome: &Result<Verdict>) -> u8 {
    match outcome {
        Ok(Verdict::Pass) => 0,
        Ok(Verdict::Fail) => 1,
        Err(_) => 2,
    }
}

/// Error chain messages, skipping causes the previous message already shows
fn error_lines(err: &anyhow::Error) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if lines.last().map_or(false, |prev| prev.contains(&text)) {
            continue;
        }
        lines.push(text);
    }
    lines
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<Verdict> {
    // Gates read only their artifact, so config is loaded per command
    let config_path = cli.config;
    let load = || EvalConfig::load(config_path.as_deref()).context("failed to load configuration");

    match cli.command {
        Commands::Eval(args) => run_eval(&load()?, args).await,
        Commands::Ablate(args) => run_ablate(&load()?, args).await,
        Commands::Reliability(args) => run_reliability(&load()?, args).await,
        Commands::Gate(command) => run_gate(&command),
        Commands::Ingest(args) => run_ingest(&load()?, args).await,
        Commands::Ask(args) => run_ask(&load()?, args).await,
        Commands::Monitor(args) => run_monitor(&load()?, args),
    }
}

fn client(config: &EvalConfig) -> Result<Arc<OpenAiClient>> {
    let client = OpenAiClient::from_env(
        &config.llm.base_url,
        &config.llm.api_key_env,
        config.llm_timeout(),
    )?;
    Ok(Arc::new(client))
}

fn judge(config: &EvalConfig, client: Arc<OpenAiClient>, model: Option<String>) -> Judge {
    let mut settings = config.judge.clone();
    if let Some(model) = model {
        settings.model = model;
    }
    Judge::new(client, settings)
}

fn store(config: &EvalConfig, client: Arc<OpenAiClient>) -> Result<Arc<QdrantStore>> {
    let store = QdrantStore::connect(config.store.clone(), client)
        .with_context(|| format!("failed to connect to Qdrant at {}", config.store.url))?;
    Ok(Arc::new(store))
}

fn pipeline(config: &EvalConfig, client: Arc<OpenAiClient>, store: Arc<QdrantStore>) -> Arc<RagPipeline> {
    Arc::new(RagPipeline::new(store, client, config.generator.clone()))
}

async fn run_eval(config: &EvalConfig, args: EvalArgs) -> Result<Verdict> {
    let dataset = load_dataset(&args.dataset)?;
    let output = args.output.unwrap_or_else(|| PathBuf::from(&config.paths.results));
    let client = client(config)?;

    let mut runner = EvaluationRunner::new(judge(config, client.clone(), args.judge_model))
        .with_top_k(args.top_k);
    if args.mode == EvalMode::Nightly {
        let store = store(config, client.clone())?;
        runner = runner.with_generator(pipeline(config, client, store));
    }

    let summary = runner.run(&dataset, args.mode, &output).await?;

    println!("\nSaved: {}", summary.output.display());
    println!("Mean overall: {:.3}", summary.mean_overall);
    Ok(Verdict::Pass)
}

async fn run_ablate(config: &EvalConfig, args: AblateArgs) -> Result<Verdict> {
    let dataset = load_dataset(&args.dataset)?;
    let questions: Vec<String> = dataset.into_iter().map(|ex| ex.question).collect();
    let pdf_dir = args.pdf_dir.unwrap_or_else(|| PathBuf::from(&config.paths.pdf_dir));
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.paths.ablation_results));

    let client = client(config)?;
    let store = store(config, client.clone())?;
    let index = Arc::new(PdfIndexBuilder::new(store.clone(), pdf_dir));
    let runner = AblationRunner::new(
        judge(config, client.clone(), args.judge_model),
        pipeline(config, client, store),
        index,
    );

    let plan = AblationPlan {
        chunk_sizes: args.chunk_sizes,
        top_ks: args.topk,
        chunk_overlap: args.chunk_overlap,
        ..AblationPlan::default()
    };

    let results = runner.run_to_file(&questions, &plan, &output).await?;
    println!(
        "\nSaved {} ablation results to: {}",
        results.len(),
        output.display()
    );
    Ok(Verdict::Pass)
}

async fn run_reliability(config: &EvalConfig, args: ReliabilityArgs) -> Result<Verdict> {
    let dataset = load_dataset(&args.dataset)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.paths.reliability_summary));

    let client = client(config)?;
    let runner = ReliabilityRunner::new(judge(config, client, args.judge_model), args.runs)?;
    let summary = runner.run_to_file(&dataset, &output).await?;

    println!(
        "\nOverall mean: {:.3} std: {:.3} ({} examples x {} runs)",
        summary.overall_mean, summary.overall_std, summary.dataset_size, summary.runs_per_example
    );
    println!("Saved reliability summary to: {}", output.display());
    Ok(Verdict::Pass)
}

fn run_gate(command: &GateCommand) -> Result<Verdict> {
    let report = match command {
        GateCommand::Quality {
            results,
            min_overall,
        } => gates::quality::run(results, *min_overall)?,
        GateCommand::Refusal {
            results,
            min_refusal_rate,
        } => gates::refusal::run(results, *min_refusal_rate)?,
        GateCommand::Hallucination {
            results,
            max_hallucination_rate,
        } => gates::hallucination::run(results, *max_hallucination_rate)?,
        GateCommand::Stability { summary, max_std } => gates::stability::run(summary, *max_std)?,
    };

    Ok(print_gate(&report))
}

fn print_gate(report: &GateReport) -> Verdict {
    print!("{}", report);
    if report.passed {
        println!("{} {} gate", "PASS".green().bold(), report.gate);
        Verdict::Pass
    } else {
        println!("{} {} gate", "FAIL".red().bold(), report.gate);
        Verdict::Fail
    }
}

async fn run_ingest(config: &EvalConfig, args: IngestArgs) -> Result<Verdict> {
    let pdf_dir = args.pdf_dir.unwrap_or_else(|| PathBuf::from(&config.paths.pdf_dir));
    let client = client(config)?;
    let store = store(config, client)?;

    let total = ingest_pdf_dir(&store, &pdf_dir, args.reset, args.chunk_size, args.chunk_overlap)
        .await
        .with_context(|| format!("failed to ingest {}", pdf_dir.display()))?;

    println!("{} Ingested total chunks: {}", "✓".green(), total);
    Ok(Verdict::Pass)
}

async fn run_ask(config: &EvalConfig, args: AskArgs) -> Result<Verdict> {
    // Resolve metrics settings before any network work
    let logger = MetricsLogger::new(MetricsConfig::from_env()?);
    let classifier = AnswerClassifier::new()?;

    let client = client(config)?;
    let store = store(config, client.clone())?;
    let rag = pipeline(config, client, store);

    let started = Instant::now();
    let answer = rag.answer(&args.question, args.top_k).await?;
    let latency_ms = started.elapsed().as_millis() as u64;

    println!("{}\n", answer.answer);
    for (idx, chunk) in answer.chunks.iter().enumerate() {
        println!(
            "  [{}] {} (chunk {}, distance {})",
            idx + 1,
            chunk.source.as_deref().unwrap_or("unknown"),
            chunk
                .chunk_index
                .map(|i| i.to_string())
                .unwrap_or_else(|| "?".to_string()),
            chunk
                .distance
                .map(|d| format!("{:.3}", d))
                .unwrap_or_else(|| "n/a".to_string()),
        );
    }

    let request_id = Uuid::new_v4().to_string();
    let chunk_distances = distances(&answer.chunks);
    let metric = make_metric(MetricInput {
        request_id: &request_id,
        question: &args.question,
        top_k: args.top_k,
        distances: &chunk_distances,
        cited: classifier.has_citation(&answer.answer),
        refusal: classifier.is_refusal(&answer.answer),
        latency_ms,
        source: None,
        model: &config.generator.model,
        collection: &config.store.collection,
        extra: serde_json::Map::new(),
    });
    logger.log(&metric)?;

    Ok(Verdict::Pass)
}

fn run_monitor(config: &EvalConfig, args: MonitorArgs) -> Result<Verdict> {
    let metrics_path = args
        .metrics
        .unwrap_or_else(|| PathBuf::from(&config.paths.metrics));
    let baseline_path = args
        .baseline
        .unwrap_or_else(|| PathBuf::from(&config.paths.baseline));

    let metrics = read_metrics_log(&metrics_path)?;
    let summary = summarize_metrics(&metrics)?;

    println!("Requests: {}", summary.count);
    println!("Refusal rate: {:.3}", summary.refusal_rate);
    println!("Cited rate: {:.3}", summary.cited_rate);
    println!("Mean question length: {:.1}", summary.question_len_mean);
    match summary.mean_distance {
        Some(distance) => println!("Mean retrieval distance: {:.3}", distance),
        None => println!("Mean retrieval distance: n/a"),
    }
    println!("Mean latency: {:.0} ms", summary.latency_ms_mean);

    let alerts = check_alerts(summary.refusal_rate, summary.mean_distance);
    if alerts.is_empty() {
        println!("{} no alerts", "OK".green().bold());
    }
    for alert in &alerts {
        warn!(alert = %alert, "monitoring alert");
        println!("{} {}", "ALERT".yellow().bold(), alert);
    }

    match (load_baseline(&baseline_path)?, summary.as_baseline()) {
        (Some(baseline), Some(current)) => {
            let drift = compute_drift_score(&current, &baseline);
            println!(
                "Drift: delta_question_len_mean={:.3} delta_mean_distance_mean={:.3}",
                drift.delta_question_len_mean, drift.delta_mean_distance_mean
            );
        }
        (None, _) => info!(path = %baseline_path.display(), "no baseline recorded, skipping drift"),
        (Some(_), None) => info!("no retrieval distances in metrics, skipping drift"),
    }

    Ok(Verdict::Pass)
}
