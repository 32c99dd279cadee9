//! Surveygraph CLI
//!
//! Command-line interface for the survey transformation pipeline:
//! - Reconstructing question documents from flat fact rows
//! - Normalizing nested LimeSurvey question JSON into flat relations
//! - Exporting question documents as `.lsq` wire documents
//! - Listing the group outline of the knowledge graph
//! - Driving a complete survey import against LimeSurvey

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use surveygraph_export_lsq::{LsqSerializer, WireSchema};
use surveygraph_import::{
    import_survey, GraphDbClient, GraphDbConfig, GroupPlan, ImportReport, LimeConfig,
    LimeSurveyClient, SurveyImporter, SurveyPlan,
};
use surveygraph_ingest_graph::{reconstruct_question, FactRow};
use surveygraph_ingest_lime::normalize;
use surveygraph_model::QuestionDocument;

#[derive(Parser)]
#[command(name = "surveygraph")]
#[command(
    author,
    version,
    about = "Survey knowledge-graph to LimeSurvey transformation pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct a question document from flat fact rows (JSON array).
    Reconstruct {
        /// Input fact-row JSON file
        input: PathBuf,
        /// Output document JSON (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Normalize nested question JSON into flat per-kind relations.
    Normalize {
        /// Input nested question JSON file (array of documents)
        input: PathBuf,
        /// Output JSON (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Serialize a question document into a `.lsq` wire document.
    Export {
        /// Input question-document JSON file
        input: PathBuf,
        /// Output `.lsq` file
        #[arg(short, long)]
        out: PathBuf,
        /// Document language
        #[arg(long, default_value = "en")]
        language: String,
    },

    /// List the group → question outline of the knowledge graph.
    Groups,

    /// Fetch one question's complete document from the knowledge graph.
    Fetch {
        /// Question node URI
        uri: String,
    },

    /// List the surveys the configured LimeSurvey account can see.
    Surveys,

    /// Pull a survey's question documents from LimeSurvey and normalize
    /// them into flat relations.
    Pull {
        /// Survey id to export
        #[arg(long)]
        survey_id: i64,
        /// Output JSON (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Import the knowledge graph's questionnaire into LimeSurvey.
    Import {
        /// Title of the survey to create
        #[arg(long)]
        title: String,
        /// Activate the survey after a fully successful import
        #[arg(long)]
        activate: bool,
        /// Write the import report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Reconstruct { input, out } => cmd_reconstruct(&input, out.as_deref()),
        Commands::Normalize { input, out } => cmd_normalize(&input, out.as_deref()),
        Commands::Export {
            input,
            out,
            language,
        } => cmd_export(&input, &out, &language),
        Commands::Groups => cmd_groups(),
        Commands::Fetch { uri } => cmd_fetch(&uri),
        Commands::Surveys => cmd_surveys(),
        Commands::Pull { survey_id, out } => cmd_pull(survey_id, out.as_deref()),
        Commands::Import {
            title,
            activate,
            report,
        } => cmd_import(&title, activate, report.as_deref()),
    }
}

fn write_or_print(out: Option<&std::path::Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("{} {}", "wrote".green(), path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

fn cmd_reconstruct(input: &std::path::Path, out: Option<&std::path::Path>) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let rows: Vec<FactRow> = serde_json::from_str(&text).context("invalid fact-row JSON")?;

    match reconstruct_question(&rows)? {
        Some(document) => {
            let json = serde_json::to_string_pretty(&document)?;
            write_or_print(out, &json)
        }
        None => Err(anyhow!("no fact rows: nothing to reconstruct")),
    }
}

fn cmd_normalize(input: &std::path::Path, out: Option<&std::path::Path>) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let docs: Vec<serde_json::Value> =
        serde_json::from_str(&text).context("invalid question JSON")?;

    let batch = normalize(&docs);
    for warning in &batch.warnings {
        eprintln!("{} {warning}", "warning:".yellow());
    }
    println!(
        "{} {} questions, {} subquestions, {} answer options, {} attributes",
        "normalized".green(),
        batch.questions.len(),
        batch.subquestions.len(),
        batch.answer_options.len(),
        batch.attributes.len() + batch.localized_attributes.len(),
    );

    let json = serde_json::to_string_pretty(&batch)?;
    write_or_print(out, &json)
}

fn cmd_export(input: &std::path::Path, out: &std::path::Path, language: &str) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let document: QuestionDocument =
        serde_json::from_str(&text).context("invalid question-document JSON")?;

    let serializer = LsqSerializer::new(WireSchema::v6(language));
    let wire = serializer.serialize(&document)?;
    let xml = wire.to_xml()?;

    fs::write(out, &xml).with_context(|| format!("failed to write {}", out.display()))?;
    println!(
        "{} {} ({} bytes)",
        "exported".green(),
        out.display(),
        xml.len()
    );
    Ok(())
}

fn cmd_groups() -> Result<()> {
    let graphdb = GraphDbClient::new(GraphDbConfig::from_env())?;
    let trees = graphdb.fetch_groups()?;

    if trees.is_empty() {
        println!("{}", "no groups found".yellow());
        return Ok(());
    }

    for tree in &trees {
        println!(
            "{} {} ({} questions)",
            tree.group.name.bold(),
            format!("[{}]", tree.group.id).dimmed(),
            tree.questions.len()
        );
        for question in &tree.questions {
            println!("  {} {}", question.label().cyan(), question.text.dimmed());
        }
    }
    Ok(())
}

fn cmd_fetch(uri: &str) -> Result<()> {
    let graphdb = GraphDbClient::new(GraphDbConfig::from_env())?;
    match graphdb.fetch_question(uri)? {
        Some(document) => {
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        None => Err(anyhow!("no data for question {uri}")),
    }
}

fn cmd_surveys() -> Result<()> {
    let mut client = LimeSurveyClient::new(LimeConfig::from_env())?;
    let listing = client.list_surveys()?;
    client.release_session();

    let surveys = listing.as_array().cloned().unwrap_or_default();
    if surveys.is_empty() {
        println!("{}", "no surveys visible for this account".yellow());
        return Ok(());
    }
    for survey in &surveys {
        let sid = survey
            .get("sid")
            .map(|v| match v.as_str() {
                Some(s) => s.to_string(),
                None => v.to_string(),
            })
            .unwrap_or_default();
        let title = survey
            .get("surveyls_title")
            .and_then(|v| v.as_str())
            .unwrap_or("(untitled)");
        println!("{} {}", sid.bold(), title);
    }
    Ok(())
}

fn cmd_pull(survey_id: i64, out: Option<&std::path::Path>) -> Result<()> {
    let mut client = LimeSurveyClient::new(LimeConfig::from_env())?;

    let listing = client.list_questions(survey_id)?;
    let listed = listing.as_array().cloned().unwrap_or_default();
    println!("{} {} questions listed", "pull".bold(), listed.len());

    let mut docs = Vec::new();
    for entry in &listed {
        let qid = entry
            .get("qid")
            .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok())));
        let Some(qid) = qid else {
            eprintln!("{} listed question without qid, skipped", "warning:".yellow());
            continue;
        };
        match client.get_question_properties(qid) {
            Ok(doc) => docs.push(doc),
            Err(e) => eprintln!("{} question {qid}: {e}", "warning:".yellow()),
        }
    }
    client.release_session();

    let batch = normalize(&docs);
    for warning in &batch.warnings {
        eprintln!("{} {warning}", "warning:".yellow());
    }
    println!(
        "{} {} questions, {} subquestions, {} answer options",
        "normalized".green(),
        batch.questions.len(),
        batch.subquestions.len(),
        batch.answer_options.len(),
    );

    let json = serde_json::to_string_pretty(&batch)?;
    write_or_print(out, &json)
}

fn print_report(report: &ImportReport) {
    println!(
        "\n{} survey {}: {}/{} questions imported, {} groups created",
        "done".green().bold(),
        report.survey_id,
        report.questions_imported,
        report.questions_attempted,
        report.groups_created
    );
    if !report.failures.is_empty() {
        println!("{}", "failures:".red().bold());
        for failure in &report.failures {
            println!(
                "  {} [{}] {}",
                failure.label.red(),
                failure.stage,
                failure.message
            );
        }
    }
}

fn cmd_import(title: &str, activate: bool, report_path: Option<&std::path::Path>) -> Result<()> {
    let lime_config = LimeConfig::from_env();
    let graphdb = GraphDbClient::new(GraphDbConfig::from_env())?;

    println!("{} fetching group outline...", "import".bold());
    let trees = graphdb.fetch_groups()?;
    if trees.is_empty() {
        return Err(anyhow!("the knowledge graph holds no question groups"));
    }
    println!("  {} groups found", trees.len());

    let plan = SurveyPlan {
        title: title.to_string(),
        language: lime_config.language.clone(),
        groups: trees.into_iter().map(GroupPlan::from).collect(),
        ungrouped: Vec::new(),
    };

    let serializer = LsqSerializer::new(WireSchema::v6(&lime_config.language));
    let mut client = LimeSurveyClient::new(lime_config)?;

    let report = import_survey(&mut client, &graphdb, &serializer, &plan)?;
    print_report(&report);

    if activate {
        if report.failures.is_empty() {
            let survey_id: i64 = report.survey_id.parse().context("non-numeric survey id")?;
            client.activate_survey(survey_id)?;
            println!("{} survey {survey_id} activated", "ok".green());
        } else {
            println!(
                "{}",
                "skipping activation: import finished with failures".yellow()
            );
        }
    }

    client.release_session();
    println!("{}", client.config().admin_url(report.survey_id.parse()?));

    if let Some(path) = report_path {
        fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{} {}", "report written to".green(), path.display());
    }

    Ok(())
}
