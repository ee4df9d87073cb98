//! keycaps CLI: render a keycap set through an external CAD renderer.

use clap::{Parser, Subcommand};
use keycaps::catalog::Catalog;
use keycaps::config::{Config, KeyTables};
use keycaps::model::OutputMode;
use keycaps::render::{DispatchOptions, Dispatcher, RenderSettings};
use keycaps::telemetry::{TelemetryConfig, init_telemetry};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "keycaps", about = "Generate keycap models in batch")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every key in the catalog
    Render {
        /// Output directory [env: KEYCAPS_OUT_DIR]
        #[arg(long, short)]
        out: Option<PathBuf>,
        /// Renderer executable [env: KEYCAPS_RENDERER]
        #[arg(long)]
        renderer: Option<PathBuf>,
        /// Template file handed to the renderer [env: KEYCAPS_TEMPLATE]
        #[arg(long)]
        template: Option<PathBuf>,
        /// Separate keycap/label files, or one combined file per key
        #[arg(long, default_value_t = OutputMode::Split)]
        mode: OutputMode,
        /// TOML file overriding the built-in key tables
        #[arg(long)]
        tables: Option<PathBuf>,
        /// Render only these keys (repeatable)
        #[arg(long = "only", value_name = "KEY")]
        only: Vec<String>,
        /// Maximum renderers running at once [env: KEYCAPS_MAX_CONCURRENT]
        #[arg(long)]
        max_concurrent: Option<NonZeroUsize>,
        /// Remove .stl files this catalog would not produce
        #[arg(long)]
        prune: bool,
        /// Discard renderer output
        #[arg(long, short)]
        quiet_renderer: bool,
        /// Print the command lines without running them
        #[arg(long)]
        dry_run: bool,
        /// Write a JSON report of every job
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the key catalog
    List {
        /// TOML file overriding the built-in key tables
        #[arg(long)]
        tables: Option<PathBuf>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "keycaps".to_string(),
        default_filter: config.log_level.clone(),
    })?;

    match cli.command {
        Command::Render {
            out,
            renderer,
            template,
            mode,
            tables,
            only,
            max_concurrent,
            prune,
            quiet_renderer,
            dry_run,
            report,
        } => {
            let catalog = load_catalog(tables.as_deref(), &only)?;
            let settings = RenderSettings::new(
                renderer.unwrap_or(config.renderer),
                template.unwrap_or(config.template),
                out.unwrap_or(config.out_dir),
            )
            .mode(mode);
            let options = DispatchOptions {
                max_concurrent: max_concurrent.or(config.max_concurrent),
                prune_stale: prune,
                quiet_renderer,
            };

            if dry_run {
                cmd_plan(&settings, &catalog);
                Ok(())
            } else {
                cmd_render(Dispatcher::new(settings, options), &catalog, report).await
            }
        }
        Command::List { tables, json } => {
            let catalog = load_catalog(tables.as_deref(), &[])?;
            cmd_list(&catalog, json)
        }
    }
}

fn load_catalog(tables: Option<&Path>, only: &[String]) -> anyhow::Result<Catalog> {
    let tables = match tables {
        Some(path) => KeyTables::load(path)?,
        None => KeyTables::default(),
    };
    let catalog = Catalog::build(&tables)?;
    if only.is_empty() {
        Ok(catalog)
    } else {
        Ok(catalog.filter(only)?)
    }
}

fn cmd_plan(settings: &RenderSettings, catalog: &Catalog) {
    for job in settings.plan(catalog) {
        println!("{}", job.command_line());
    }
}

async fn cmd_render(
    dispatcher: Dispatcher,
    catalog: &Catalog,
    report_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let settings = dispatcher.settings();
    println!(
        "Rendering {} keys ({} mode) into {}",
        catalog.len(),
        settings.mode,
        settings.out_dir.display()
    );
    for key in catalog {
        println!(
            "  {:<12} {:<14} size={:<4} width={}",
            key.name,
            format!("{:?}", key.text),
            key.font_size,
            key.unit_width
        );
    }

    let report = dispatcher.run(catalog).await?;

    if let Some(path) = report_path {
        report.write_json(&path)?;
        println!("Report written to {}", path.display());
    }

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!();
        println!("Failed jobs:");
        for outcome in &failures {
            println!(
                "  {:<12} {:<8} {}",
                outcome.key,
                outcome.part.to_string(),
                outcome.status
            );
        }
    }

    println!();
    println!("Done! {}", report.summary());

    if failures.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} render job(s) failed", failures.len())
    }
}

fn cmd_list(catalog: &Catalog, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.keys())?);
        return Ok(());
    }

    println!("{:<12}  {:<14}  {:<5}  WIDTH", "NAME", "TEXT", "SIZE");
    println!("{}", "-".repeat(44));
    for key in catalog {
        println!(
            "{:<12}  {:<14}  {:<5}  {}",
            key.name,
            format!("{:?}", key.text),
            key.font_size,
            key.unit_width
        );
    }
    println!("\n{} key(s)", catalog.len());
    Ok(())
}
