mod display;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use termscope_ai::{DEFAULT_EXEMPLARS, HashedBowEncoder, SemanticCapability, SemanticClassifier};
use termscope_engine::{Analyzer, EngineConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "termscope",
    about = "Score terms-of-service documents for user-hostile clauses",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a document and print its risk report
    Analyze {
        /// Text file to analyze (reads stdin if omitted or "-")
        file: Option<PathBuf>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Identifier echoed back in the result
        #[arg(long)]
        id: Option<String>,

        #[command(flatten)]
        engine: EngineArgs,
    },
    /// List the rule categories and their weights
    Rules {
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct EngineArgs {
    /// TOML file with engine tunables
    #[arg(long, env = "TERMSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Semantic similarity threshold, overrides the config file
    #[arg(long, env = "TERMSCOPE_ML_THRESHOLD")]
    threshold: Option<f32>,

    /// Sentence encoder for the semantic layer
    #[arg(long, value_enum, default_value_t = EncoderKind::Auto)]
    encoder: EncoderKind,

    /// Directory holding model.onnx and tokenizer.json
    #[arg(long, env = "TERMSCOPE_MODEL_DIR", default_value = "models/encoder")]
    model_dir: PathBuf,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EncoderKind {
    /// ONNX model if one is available, otherwise patterns only
    Auto,
    Onnx,
    /// Vocabulary-overlap encoder; needs no model files
    Hashed,
    /// Patterns only
    None,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Analyze {
            file,
            json,
            id,
            engine,
        } => cmd_analyze(file.as_deref(), json, id.as_deref(), &engine),
        Command::Rules { json } => cmd_rules(json),
    }
}

fn cmd_analyze(
    file: Option<&Path>,
    json: bool,
    id: Option<&str>,
    args: &EngineArgs,
) -> anyhow::Result<()> {
    let bytes = read_input(file)?;

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        config.ml_confidence_threshold = threshold;
    }

    let semantic = semantic_capability(args)?;
    let analyzer = Analyzer::new(config, semantic)?;

    let text = termscope_core::decode_text(&bytes)
        .with_context(|| format!("reading {}", display_name(file)))?;
    let id = id.or_else(|| file.and_then(Path::file_name).and_then(|n| n.to_str()));
    let result = analyzer.analyze_document(id, text)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        display::print_report(&result);
    }
    Ok(())
}

fn cmd_rules(json: bool) -> anyhow::Result<()> {
    let analyzer = Analyzer::pattern_only(EngineConfig::default())?;
    if json {
        let rows: Vec<serde_json::Value> = analyzer
            .rules()
            .categories()
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "namespace": c.namespace.as_str(),
                    "title": c.title,
                    "severity": c.severity.as_str(),
                    "weight": c.weight,
                    "patterns": c.rules.len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        display::print_rules(analyzer.rules());
    }
    Ok(())
}

fn semantic_capability(args: &EngineArgs) -> anyhow::Result<SemanticCapability> {
    Ok(match args.encoder {
        EncoderKind::None => SemanticCapability::Disabled,
        EncoderKind::Hashed => SemanticCapability::from_build(SemanticClassifier::build(
            Arc::new(HashedBowEncoder::default()),
            DEFAULT_EXEMPLARS,
        )),
        EncoderKind::Onnx => {
            anyhow::ensure!(
                cfg!(feature = "onnx"),
                "this build has no ONNX support; rebuild with --features onnx"
            );
            load_onnx(&args.model_dir)
        }
        EncoderKind::Auto if cfg!(feature = "onnx") && args.model_dir.is_dir() => {
            load_onnx(&args.model_dir)
        }
        EncoderKind::Auto => SemanticCapability::Disabled,
    })
}

#[cfg(feature = "onnx")]
fn load_onnx(model_dir: &Path) -> SemanticCapability {
    SemanticCapability::load_onnx(model_dir, DEFAULT_EXEMPLARS)
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(_model_dir: &Path) -> SemanticCapability {
    SemanticCapability::Disabled
}

fn read_input(file: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) if path != Path::new("-") => {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn display_name(file: Option<&Path>) -> String {
    match file {
        Some(path) if path != Path::new("-") => path.display().to_string(),
        _ => "stdin".to_string(),
    }
}
