//! `promptgauge assess`: assess a prompt and project its running cost.

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use clap::Args;
use promptgauge_core::{AssessError, StatusUpdate};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use super::BackendArgs;
use crate::render;

#[derive(Args)]
pub struct AssessArgs {
    /// The prompt to assess, or `-` to read it from stdin
    pub prompt: Option<String>,

    /// Read the prompt from a file
    #[arg(short, long, conflicts_with = "prompt")]
    pub file: Option<PathBuf>,

    /// What the prompt is for (audience, product, model class)
    #[arg(short, long)]
    pub context: Option<String>,

    #[command(flatten)]
    pub backend: BackendArgs,

    /// Print the normalized result as JSON
    #[arg(long)]
    pub json: bool,

    /// Remember the backend settings used for this run
    #[arg(long)]
    pub save: bool,
}

pub async fn run(config_path: &Path, args: AssessArgs) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    let prompt = read_prompt(&args)?;
    let context = args.context.clone().filter(|c| !c.trim().is_empty());

    let request = config.resolve_request(prompt, context, &args.backend.overrides())?;
    debug!(mode = %request.mode(), model = request.config.effective_model(), "Resolved request");

    if args.save && request.validate().is_ok() {
        config.remember(&request.config);
        config.save_to(config_path)?;
    }

    let orchestrator = super::orchestrator(&config)?;
    let mut updates = orchestrator.status_bus().subscribe();
    let show_progress = !args.json && std::io::stderr().is_terminal();
    let progress = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) if show_progress => print_progress(&update),
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let outcome = orchestrator.run_assessment(request).await;
    // Closing the bus lets the printer drain what is left, then exit.
    drop(orchestrator);
    let _ = progress.await;

    match outcome {
        Ok(result) if args.json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Ok(result) => {
            print!("{}", render::report(&result));
            Ok(())
        }
        Err(e @ AssessError::Fallback { .. }) => {
            eprintln!("⚠️  {e}");
            eprintln!();
            eprintln!("The managed session is not available. Switch to a local model instead:");
            eprintln!("    promptgauge assess --mode ollama \"<prompt>\"");
            eprintln!("or make it the default with `mode = \"ollama\"` in {}.", config_path.display());
            bail!("managed session unavailable");
        }
        Err(e) => Err(e.into()),
    }
}

fn print_progress(update: &StatusUpdate) {
    if update.stage.is_terminal() {
        return;
    }
    if update.detail.is_empty() {
        eprintln!("⏳ {}", update.headline);
    } else {
        eprintln!("⏳ {} {}", update.headline, update.detail);
    }
}

fn read_prompt(args: &AssessArgs) -> anyhow::Result<String> {
    if let Some(path) = &args.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading prompt from {}", path.display()));
    }

    match args.prompt.as_deref() {
        Some("-") => read_stdin(),
        Some(text) => Ok(text.to_string()),
        None if !std::io::stdin().is_terminal() => read_stdin(),
        None => bail!("no prompt given: pass it as an argument, with --file, or pipe it via stdin"),
    }
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading prompt from stdin")?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn args(prompt: Option<&str>, file: Option<PathBuf>) -> AssessArgs {
        AssessArgs {
            prompt: prompt.map(String::from),
            file,
            context: None,
            backend: BackendArgs::default(),
            json: false,
            save: false,
        }
    }

    #[test]
    fn prompt_from_argument() {
        assert_eq!(read_prompt(&args(Some("Write a haiku"), None)).unwrap(), "Write a haiku");
    }

    #[test]
    fn prompt_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Summarise the attached report.").unwrap();
        let prompt = read_prompt(&args(None, Some(file.path().to_path_buf()))).unwrap();
        assert_eq!(prompt, "Summarise the attached report.");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_prompt(&args(None, Some(PathBuf::from("/nonexistent/prompt.txt")))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/prompt.txt"));
    }
}
