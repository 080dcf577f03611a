use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use reading_coach::alignment::report::{Meta, REPORT_SCHEMA_VERSION};
use reading_coach::{AttemptInput, ReadingScorerBuilder, Report, ScoringConfig};
use tracing_subscriber::EnvFilter;

#[path = "score_attempt/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Parser)]
#[command(name = "score_attempt")]
#[command(about = "Score one read-aloud attempt and hand the weakest phonemes to story generation")]
struct Args {
    /// Attempt document: story paragraphs, transcripts and optional phonemes.
    #[arg(long, env = "READING_COACH_ATTEMPT")]
    attempt: PathBuf,
    #[arg(long, env = "READING_COACH_REPORT_OUT")]
    out: Option<PathBuf>,
    /// Overrides `target_phonemes_path` from the config.
    #[arg(long, env = "READING_COACH_TARGET_PHONEMES")]
    target_phonemes: Option<PathBuf>,
    #[arg(long, env = "READING_COACH_CONFIG")]
    config: Option<PathBuf>,
    /// JSON object of `symbol -> label` overrides.
    #[arg(long, env = "READING_COACH_LABELS")]
    labels: Option<PathBuf>,
    #[arg(long, env = "READING_COACH_SEED")]
    seed: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let mut config = match args.config.as_ref() {
        Some(path) => ScoringConfig::load(&resolve_path(&repo_root, path))
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => ScoringConfig::default(),
    };
    if let Some(labels) = args.labels.as_ref() {
        config.labels_path = Some(resolve_path(&repo_root, labels).to_string_lossy().into_owned());
    }
    if let Some(seed) = args.seed {
        config.rng_seed = Some(seed);
    }

    let scorer = ReadingScorerBuilder::new(config)
        .build()
        .map_err(|err| format!("Failed to build scorer: {err}"))?;

    let attempt_path = resolve_path(&repo_root, &args.attempt);
    let input = load_attempt(&attempt_path)?;
    if input.story.is_empty() {
        return Err(format!(
            "Attempt '{}' has no story paragraphs.",
            attempt_path.display()
        ));
    }

    let attempt = scorer.score_attempt(&input);
    let target_path = scorer
        .persist_target_phonemes(
            &attempt,
            args.target_phonemes
                .as_ref()
                .map(|path| resolve_path(&repo_root, path))
                .as_deref(),
        )
        .map_err(|err| format!("Failed to write target phonemes: {err}"))?;

    let report = Report {
        schema_version: REPORT_SCHEMA_VERSION,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            attempt_path: attempt_path.display().to_string(),
            target_phonemes_path: Some(target_path.display().to_string()),
            paragraph_count: input.story.len(),
        },
        attempt,
    };

    let out_path = resolve_out_path(&repo_root, args.out.as_ref());
    json_report_formatter::write_report(&out_path, &report)?;

    println!("{}", out_path.display());
    println!("{}", target_path.display());
    Ok(())
}

fn load_attempt(path: &Path) -> Result<AttemptInput, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read attempt '{}': {err}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|err| format!("Failed to parse attempt '{}': {err}", path.display()))
}

fn resolve_out_path(repo_root: &Path, out: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = out {
        return resolve_path(repo_root, path);
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    repo_root
        .join("target")
        .join("attempt_reports")
        .join(format!("attempt-report-{run_id}.json"))
}

fn resolve_path(repo_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_root.join(path)
    }
}
