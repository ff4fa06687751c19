//! casegate CLI - validation and review workflow for clinical cases.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use casegate_core::{CaseFilter, CaseId, CaseStatus, ClinicalCase, Complexity, ScoreRules};
use casegate_quality::{parse_content_lenient, render_report, ValidationEngine};
use casegate_storage::{CaseStore, JsonStorage};
use casegate_work::WorkflowEngine;

#[derive(Parser)]
#[command(name = "casegate")]
#[command(about = "Validation and review workflow for clinical teaching cases", long_about = None)]
struct Cli {
    /// Store directory
    #[arg(long, global = true, default_value = ".casegate")]
    store: PathBuf,

    /// Rule override file (JSON)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a case from a JSON file
    Import {
        /// Case file
        file: PathBuf,
    },
    /// List cases
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<CaseStatus>,
    },
    /// Validate a stored case and record the score
    Validate {
        /// Case ID
        id: CaseId,
    },
    /// Validate case content from a file without storing anything
    ValidateFile {
        /// Content file
        file: PathBuf,
    },
    /// Submit a draft for review
    Submit {
        /// Case ID
        id: CaseId,
        #[arg(long)]
        actor: String,
        /// Note for the reviewer
        #[arg(long)]
        comment: Option<String>,
    },
    /// Approve a case in review
    Approve {
        /// Case ID
        id: CaseId,
        #[arg(long)]
        actor: String,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Reject a case in review
    Reject {
        /// Case ID
        id: CaseId,
        #[arg(long)]
        actor: String,
        /// Why the case is rejected
        #[arg(long)]
        reason: String,
        /// Improvement suggestion (repeatable)
        #[arg(long = "suggestion")]
        suggestions: Vec<String>,
        /// Leave the case in review instead of returning it to draft
        #[arg(long)]
        keep_status: bool,
    },
    /// Publish an approved case
    Publish {
        /// Case ID
        id: CaseId,
        #[arg(long)]
        actor: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Archive a case
    Archive {
        /// Case ID
        id: CaseId,
        #[arg(long)]
        actor: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Show a case's workflow status
    Status {
        /// Case ID
        id: CaseId,
    },
    /// Show the review queue
    Queue,
    /// Show a case's audit trail
    Comments {
        /// Case ID
        id: CaseId,
    },
}

/// Case file accepted by `import`.
#[derive(serde::Deserialize)]
struct CaseFile {
    title: String,
    #[serde(default)]
    indication: String,
    #[serde(default)]
    complexity: Option<String>,
    #[serde(default)]
    content: serde_json::Value,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let rules = load_rules(cli.rules.as_deref())?;

    // Needs no store.
    if let Commands::ValidateFile { file } = &cli.command {
        let value = read_json(file)?;
        let content = value.get("content").unwrap_or(&value);
        let report = ValidationEngine::new(rules.validation).validate_json(content);
        print!("{}", render_report(&report));
        return Ok(());
    }

    let storage = JsonStorage::new(&cli.store)
        .await
        .with_context(|| format!("opening store at {}", cli.store.display()))?;
    let validator = ValidationEngine::new(rules.validation.clone());
    let bands = rules.bands.clone();
    let engine = WorkflowEngine::new(storage, rules);

    match cli.command {
        Commands::ValidateFile { .. } => {}
        Commands::Import { file } => {
            let record: CaseFile = serde_json::from_value(read_json(&file)?)
                .with_context(|| format!("parsing case file {}", file.display()))?;
            let complexity = record.complexity.as_deref().and_then(Complexity::parse_lenient);
            let mut case = ClinicalCase::new(record.title, record.indication, complexity);
            case.content = parse_content_lenient(&record.content);

            engine.store().lock().await.save_case(&case).await?;
            info!(case_id = %case.id, "imported case");
            println!("Imported case: {} - {}", case.id, case.title);
        }
        Commands::List { status } => {
            let filter = CaseFilter {
                status: status.map(|s| vec![s]),
                ..Default::default()
            };
            let cases = engine.store().lock().await.list_cases(&filter).await?;

            println!("Cases ({})", cases.len());
            for case in cases {
                let band = bands
                    .classify(case.validation_score)
                    .map_or("-", |b| b.label());
                println!(
                    "  {} | {} | {} | {} - {}",
                    case.id,
                    case.status,
                    case.complexity.map_or("-", |c| c.as_str()),
                    band,
                    case.title,
                );
            }
        }
        Commands::Validate { id } => {
            let report = engine.record_validation(id, &validator).await?;
            print!("{}", render_report(&report));
        }
        Commands::Submit { id, actor, comment } => {
            let result = engine.submit_for_review(id, &actor, comment.as_deref()).await?;
            println!("{}: {} -> {}", result.message, result.previous_status, result.new_status);
        }
        Commands::Approve { id, actor, comment } => {
            let result = engine.approve_case_for_review(id, &actor, comment.as_deref()).await?;
            println!("{}: {} -> {}", result.message, result.previous_status, result.new_status);
        }
        Commands::Reject { id, actor, reason, suggestions, keep_status } => {
            let result = engine
                .reject_case(id, &actor, &reason, &suggestions, !keep_status)
                .await?;
            println!("{}: {} -> {}", result.message, result.previous_status, result.new_status);
        }
        Commands::Publish { id, actor, description } => {
            let result = engine.publish_case(id, &actor, description.as_deref()).await?;
            println!("{}: {} -> {}", result.message, result.previous_status, result.new_status);
        }
        Commands::Archive { id, actor, reason } => {
            let result = engine.archive_case(id, &actor, reason.as_deref()).await?;
            println!("{}: {} -> {}", result.message, result.previous_status, result.new_status);
        }
        Commands::Status { id } => {
            let Some(summary) = engine.get_workflow_status(id).await? else {
                println!("Case not found");
                return Ok(());
            };

            println!("Case: {}", id);
            println!("  Status: {} ({})", summary.current_status, summary.current_status.label());
            let next: Vec<&str> = summary.valid_next_steps.iter().map(|s| s.as_str()).collect();
            println!("  Next steps: {}", next.join(", "));
            println!("  Can submit: {}", summary.can_submit_for_review);
            println!("  Can approve: {}", summary.can_approve);
            println!("  Can publish: {}", summary.can_publish);

            let review = summary.review_status;
            print_stamp("Submitted", review.submitted_at, review.submitted_by);
            print_stamp("Reviewed", review.reviewed_at, review.reviewed_by);
            print_stamp("Published", review.published_at, review.published_by);
            print_stamp("Archived", review.archived_at, review.archived_by);

            if summary.current_status == CaseStatus::Draft && !summary.can_submit_for_review {
                let check = engine.can_submit_for_review(id).await?;
                println!("  Blocking submission:");
                for reason in check.reasons {
                    println!("    - {}", reason);
                }
            }
        }
        Commands::Queue => {
            let queue = engine.review_queue();
            let now = chrono::Utc::now();
            let stats = queue.stats(now).await?;
            let entries = queue.entries(now).await?;

            println!(
                "Review queue: {} pending, {} overdue, {} ready to publish",
                stats.pending, stats.overdue, stats.ready_to_publish
            );
            for entry in entries {
                println!(
                    "  {:>5.2} | {} | {:>6.1}h | {} - {}",
                    entry.priority,
                    entry.complexity.map_or("-", |c| c.as_str()),
                    entry.hours_waiting,
                    entry.case_id,
                    entry.title,
                );
            }
        }
        Commands::Comments { id } => {
            let comments = engine.list_comments(id).await?;
            println!("Comments ({})", comments.len());
            for comment in comments {
                println!("  [{}] {}:", comment.created_at.format("%Y-%m-%d %H:%M"), comment.author);
                for line in comment.content.lines() {
                    println!("    {}", line);
                }
            }
        }
    }

    Ok(())
}

fn load_rules(path: Option<&Path>) -> Result<ScoreRules> {
    let Some(path) = path else {
        return Ok(ScoreRules::default());
    };
    ScoreRules::from_json_file(path)
        .with_context(|| format!("loading rules from {}", path.display()))
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

fn print_stamp(label: &str, at: Option<casegate_core::Time>, by: Option<String>) {
    if let Some(at) = at {
        println!("  {}: {} by {}", label, at.to_rfc3339(), by.as_deref().unwrap_or("?"));
    }
}
