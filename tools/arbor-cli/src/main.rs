use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use arbor_conllu::ConlluCodec;
use arbor_protocol::Tree;
use arbor_scene::systems::accuracy::{accuracy, AccuracyReport, FieldScore};
use arbor_view::{SentenceView, SentenceViewOptions, SvgSurface};

#[derive(Parser)]
#[command(author, version, about = "Renders CoNLL-U dependency trees")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one sentence to SVG
    Render {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// JSON view options
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Mark fields that differ from this tree
        #[arg(long, value_name = "FILE")]
        reference: Option<PathBuf>,

        /// Pin columns to a snapshot written by --save-columns
        #[arg(long, value_name = "FILE")]
        columns: Option<PathBuf>,

        #[arg(long, value_name = "FILE")]
        save_columns: Option<PathBuf>,

        /// 1-based sentence index in the file
        #[arg(long, default_value_t = 1)]
        sentence: usize,
    },
    /// Score HEAD, DEPREL and UPOS against a reference
    Accuracy {
        #[arg(value_name = "FILE")]
        input: PathBuf,
        #[arg(value_name = "REFERENCE")]
        reference: PathBuf,
    },
    /// Print the render order and arc level of every token
    Order {
        #[arg(value_name = "FILE")]
        input: PathBuf,
        #[arg(long, default_value_t = 1)]
        sentence: usize,
    },
}

fn read_sentence(path: &Path, index: usize) -> anyhow::Result<Tree> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut trees = ConlluCodec::new()
        .decode_all(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    if index == 0 || index > trees.len() {
        bail!("{} has {} sentence(s), asked for #{}", path.display(), trees.len(), index);
    }
    Ok(trees.swap_remove(index - 1))
}

fn load_options(path: Option<&Path>) -> anyhow::Result<SentenceViewOptions> {
    let Some(path) = path else {
        return Ok(SentenceViewOptions::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_options(&text).with_context(|| format!("parsing {}", path.display()))
}

fn parse_options(text: &str) -> anyhow::Result<SentenceViewOptions> {
    Ok(serde_json::from_str(text)?)
}

fn format_score(name: &str, score: &FieldScore) -> String {
    match score.ratio() {
        Some(ratio) => format!("{:<7}{}/{} ({:.1}%)", name, score.correct, score.total, ratio * 100.0),
        None => format!("{:<7}{}/{}", name, score.correct, score.total),
    }
}

fn format_accuracy(report: &AccuracyReport) -> String {
    [
        format_score("HEAD", &report.head),
        format_score("DEPREL", &report.deprel),
        format_score("UPOS", &report.upos),
    ]
    .join("\n")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render { input, output, config, reference, columns, save_columns, sentence } => {
            let tree = read_sentence(&input, sentence)?;
            let options = load_options(config.as_deref())?;
            info!(tokens = tree.len(), "rendering {}", input.display());

            let mut view = SentenceView::new(SvgSurface::new(), ConlluCodec::new(), tree, options);
            if let Some(path) = columns {
                let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
                view.pin_columns_from_bytes(&bytes)?;
            }
            if let Some(path) = reference {
                view.plug_reference(read_sentence(&path, sentence)?);
            }
            if let Some(path) = save_columns {
                fs::write(&path, view.snapshot_bytes()?)?;
                info!("column snapshot written to {}", path.display());
            }

            let svg = view.surface().to_svg();
            match output {
                Some(path) => {
                    fs::write(&path, svg)?;
                    eprintln!("✅ SVG written to {:?}", path);
                }
                None => print!("{}", svg),
            }
        }
        Command::Accuracy { input, reference } => {
            let current = read_sentence(&input, 1)?;
            let reference = read_sentence(&reference, 1)?;
            println!("{}", format_accuracy(&accuracy(&current, &reference)));
        }
        Command::Order { input, sentence } => {
            let tree = read_sentence(&input, sentence)?;
            let view = SentenceView::new(SvgSurface::new(), ConlluCodec::new(), tree, SentenceViewOptions::default());
            for (id, level) in view.order().iter().zip(view.levels()) {
                let form = view.tree().get(id).map(|t| t.form.as_str()).unwrap_or_default();
                println!("{}\t{}\t{}", id, form, level);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let options = parse_options(r#"{"shown_features": ["FORM", "UPOS"], "token_spacing": 30}"#).unwrap();
        assert_eq!(options.shown_features, vec!["FORM", "UPOS"]);
        assert_eq!(options.token_spacing, 30.0);
        assert!(parse_options("{not json").is_err());
    }

    #[test]
    fn test_format_accuracy() {
        let report = AccuracyReport {
            head: FieldScore { correct: 3, total: 4 },
            deprel: FieldScore { correct: 0, total: 0 },
            upos: FieldScore { correct: 4, total: 4 },
        };
        assert_eq!(format_accuracy(&report), "HEAD   3/4 (75.0%)\nDEPREL 0/0\nUPOS   4/4 (100.0%)");
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["arbor", "render", "in.conllu", "-o", "out.svg", "--sentence", "2"]).unwrap();
        match cli.command {
            Command::Render { output, sentence, .. } => {
                assert_eq!(output, Some(PathBuf::from("out.svg")));
                assert_eq!(sentence, 2);
            }
            _ => panic!("expected render"),
        }
    }
}
