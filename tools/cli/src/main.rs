//! solidtree - 3DS material inspection and solid template part generation
//!
//! `inspect` reads a 3DS model and reports its chunks and material usage.
//! `build` generates the part trees of a solid template directory from the
//! model's face-material groups.

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solidtree::chunk::{self, ids};
use solidtree::{
    BuildConfig, BuildResult, MaterialCatalog, MaterialReport, MaterialScan, MaterialStatus,
    PairingPolicy, TemplateTreeBuilder,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "solidtree")]
#[command(about = "3DS material inspection and CPlugTree part generation")]
#[command(version)]
struct Cli {
    /// Debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the chunks and materials of a 3DS model
    Inspect {
        /// Input 3DS file
        model: PathBuf,
    },

    /// Generate part trees in a solid template directory
    Build {
        /// Input 3DS file
        model: PathBuf,

        /// Template directory holding the converter output
        #[arg(short, long)]
        template: PathBuf,

        /// Name written to the root tree (default: model file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Material reference used when a group's material is not declared
        #[arg(short, long)]
        fallback: Option<String>,

        /// Fail when groups and visual files differ in count
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Inspect { model } => inspect(&model),
        Commands::Build {
            model,
            template,
            name,
            fallback,
            strict,
        } => {
            let name = match name {
                Some(name) => name,
                None => model_stem(&model)?,
            };

            let mut config = BuildConfig::new();
            if let Some(fallback) = fallback {
                config = config.with_fallback_ref(fallback);
            }
            if strict {
                config = config.with_pairing(PairingPolicy::Strict);
            }

            build(&model, &template, &name, config)
        }
    }
}

fn inspect(path: &Path) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let chunks = chunk::walk(&bytes);
    let scan = MaterialScan::from_bytes(&bytes);
    let report = MaterialReport::from_scan(&scan, &MaterialCatalog::default());

    println!("═══════════════════════════════════════════════════════════");
    println!("  3DS Material Inspector");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Loading: {}", path.display());
    println!();

    let count = |id: u16| chunks.iter().filter(|c| c.id == id).count();
    println!("┌─ Chunks ───────────────────────────────────────────────┐");
    println!("│ File size:            {:<34} │", bytes.len());
    println!("│ Chunks:               {:<34} │", chunks.len());
    println!("│ Objects (0x4000):     {:<34} │", count(ids::OBJECT));
    println!("│ Face blocks (0x4120): {:<34} │", count(ids::FACES));
    println!("│ Groups (0x4130):      {:<34} │", count(ids::FACE_MATERIAL));
    println!("│ Materials (0xA000):   {:<34} │", count(ids::MATERIAL_NAME));
    println!("│ Total faces:          {:<34} │", report.total_faces());
    println!("└────────────────────────────────────────────────────────┘");
    println!();

    if report.has_declared_blocks() {
        println!(
            "⚠ {} material block(s) (0xA000) detected; the solid pipeline requires none.",
            report.declared_blocks
        );
        println!("  Re-export the model without material blocks.");
        println!();
    }

    println!("┌─ Materials ────────────────────────────────────────────┐");
    if report.usage.is_empty() {
        println!("│ {:<54} │", "(no face-material groups)");
    }
    for usage in &report.usage {
        let status = match &usage.status {
            MaterialStatus::Known => "ok".to_string(),
            MaterialStatus::CasingMismatch { expected } => format!("expected '{}'", expected),
            MaterialStatus::Unknown => "UNKNOWN".to_string(),
        };
        println!(
            "│ {:<24} {:>10} faces  {:<16} │",
            truncate(&usage.name, 24),
            usage.face_count,
            truncate(&status, 16)
        );
    }
    println!("└────────────────────────────────────────────────────────┘");

    let unknown = report.unknown().count();
    if unknown > 0 {
        println!();
        println!("⚠ Unknown materials: {}", unknown);
    }

    Ok(())
}

fn build(model: &Path, template: &Path, name: &str, config: BuildConfig) -> Result<()> {
    let scan = MaterialScan::from_path(model)
        .with_context(|| format!("Failed to read {}", model.display()))?;
    tracing::info!(
        "Read {} face-material group(s) from {}",
        scan.groups.len(),
        model.display()
    );

    let result = TemplateTreeBuilder::new(template)
        .with_config(config)
        .build(name, &scan.groups)
        .with_context(|| format!("Failed to build trees in {}", template.display()))?;

    display_result(&result);
    Ok(())
}

fn display_result(result: &BuildResult) {
    println!("┌─ Build ────────────────────────────────────────────────┐");
    println!(
        "│ Surface:              {:<34} │",
        truncate(result.surface_ref.as_deref().unwrap_or("(none)"), 34)
    );
    println!("│ Visuals:              {:<34} │", result.visual_refs.len());
    println!("│ Parts created:        {:<34} │", result.created_parts.len());
    println!("│ Warnings:             {:<34} │", result.warnings.len());
    println!("└────────────────────────────────────────────────────────┘");

    if !result.created_parts.is_empty() {
        println!();
        println!("┌─ Parts ────────────────────────────────────────────────┐");
        for (part, reference) in result.created_parts.iter().zip(&result.part_refs) {
            println!("│ {:<30} {:<23} │", part, truncate(reference, 23));
        }
        println!("└────────────────────────────────────────────────────────┘");
    }

    if result.has_warnings() {
        println!();
        for warning in &result.warnings {
            println!("⚠ {}", warning);
        }
    }
}

fn model_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .with_context(|| format!("Cannot derive a model name from {}", path.display()))
}

/// Shorten `text` to `max` characters with a trailing ellipsis
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
