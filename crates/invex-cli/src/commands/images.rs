//! Images command - extract fields from hosted invoice images.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

/// Arguments for the images command.
#[derive(Args)]
pub struct ImagesArgs {
    /// Invoice image URLs, in page order
    #[arg(required = true, num_args = 1..)]
    urls: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

pub async fn run(args: ImagesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let extractor = super::build_extractor(config)?;

    info!("Processing {} image(s)", args.urls.len());
    let invoice = extractor.process_images(&args.urls).await?;

    let output = super::to_json(&invoice, args.pretty)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}
