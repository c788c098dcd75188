use anyhow::{anyhow, Context};
use base64::Engine;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use image_handler::config::Config;
use image_handler::{EditSet, ImageHandler, ImageRequest, OutputFormat};

/// Image Handler - apply declarative edits to an image
#[derive(Parser, Debug)]
#[command(name = "image-handler")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Original image to edit
    #[arg(short, long)]
    input: PathBuf,

    /// Edits as inline JSON or a path to a JSON file
    #[arg(short, long)]
    edits: Option<String>,

    /// Requested output format (jpeg, png, webp, avif, gif)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write decoded image bytes instead of base64 text
    #[arg(long)]
    raw: bool,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path).map_err(|e| anyhow!(e))?,
        None => Config::default(),
    };
    config.validate().map_err(|e| anyhow!(e))?;
    Ok(config)
}

fn load_edits(arg: &str) -> anyhow::Result<EditSet> {
    let trimmed = arg.trim_start();
    let json = if trimmed.starts_with('{') {
        arg.to_string()
    } else {
        std::fs::read_to_string(arg).with_context(|| format!("Failed to read edits file {arg}"))?
    };
    let value: serde_json::Value = serde_json::from_str(&json).context("Invalid edits JSON")?;
    Ok(EditSet::from_json(&value)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;
    image_handler::logging::init_subscriber(&config.logging).map_err(|e| anyhow!(e))?;

    tracing::info!(
        config_file = ?args.config,
        quality = config.processing.default_quality,
        fallback_format = %config.processing.fallback_format,
        watermark_enabled = config.watermark.enabled,
        "Configuration loaded successfully"
    );

    if args.test {
        return Ok(());
    }

    let original = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read input {}", args.input.display()))?;

    let mut request = ImageRequest::new(original);
    if let Some(edits) = &args.edits {
        request = request.with_edits(load_edits(edits)?);
    }
    if let Some(format) = args.format {
        request = request.with_output_format(format);
    }

    let handler = ImageHandler::from_config(&config).await;
    let encoded = match handler.process(&request).await {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::error!(status = e.status(), code = e.code(), error = %e, "Edit request failed");
            return Err(e.into());
        }
    };

    let body = if args.raw {
        base64::engine::general_purpose::STANDARD.decode(&encoded)?
    } else {
        encoded.into_bytes()
    };

    match &args.output {
        Some(path) => std::fs::write(path, &body)
            .with_context(|| format!("Failed to write output {}", path.display()))?,
        None => std::io::stdout().write_all(&body)?,
    }

    Ok(())
}
