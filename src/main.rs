use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dxcode_vfs::export::DEFAULT_ARCHIVE_NAME;
use dxcode_vfs::{language_for, HeadlessSurface, JsonFileStore, Workspace, WorkspaceOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dxcode-vfs")]
#[command(about = "Manage a DXCode project stored in a local record container")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Directory holding the store (overrides the config file)
    #[arg(long = "store")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List files; the active one is marked with '*'
    Ls {
        /// Output the listing as JSON
        #[arg(long = "json")]
        json: bool,
    },
    /// Create a new file
    New {
        name: String,
        /// Initial content (reads stdin when '-')
        #[arg(short = 'c', long = "content", default_value = "")]
        content: String,
    },
    /// Delete a file
    Rm { name: String },
    /// Print a file's content
    Cat { name: String },
    /// Make a file active and print its language mode
    Open { name: String },
    /// Replace a file's content with the argument, or stdin when omitted
    Write { name: String, content: Option<String> },
    /// Print the preview bundle as JSON
    Preview,
    /// Write the project as a .tar.gz archive
    Export {
        #[arg(short = 'o', long = "output", default_value = DEFAULT_ARCHIVE_NAME)]
        output: PathBuf,
    },
    /// Add the files of a .tar.gz archive to the project
    Import { archive: PathBuf },
    /// Replace the project with the starter files
    Reset,
}

fn read_stdin() -> anyhow::Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("cannot read stdin")?;
    Ok(buf)
}

fn load_options(cli: &Cli) -> anyhow::Result<WorkspaceOptions> {
    let mut options = match &cli.config {
        Some(path) => WorkspaceOptions::load(path)?,
        None => WorkspaceOptions::default(),
    };
    if let Some(store) = &cli.store {
        options.store_root = Some(store.clone());
    }
    Ok(options)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = load_options(&cli)?;
    let store = Arc::new(JsonFileStore::new(options.resolved_store_root(), &options.container_name()));
    // Refusals and save failures come back as errors, so no notice observer
    // is installed here.
    let mut workspace = Workspace::open(store, Box::new(HeadlessSurface::new()), options).await;

    match cli.command {
        Commands::Ls { json } => {
            let entries = workspace.list_entries();
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in entries {
                    let marker = if entry.is_active { '*' } else { ' ' };
                    println!("{} {:<10} {}", marker, language_for(&entry.name), entry.name);
                }
            }
        }
        Commands::New { name, content } => {
            let content = if content == "-" { read_stdin()? } else { content };
            workspace.create(&name, &content, true).await?;
            workspace.save().await?;
        }
        Commands::Rm { name } => {
            workspace.remove(&name).await?;
            workspace.save().await?;
        }
        Commands::Cat { name } => {
            print!("{}", workspace.get_content(&name)?);
        }
        Commands::Open { name } => {
            if !workspace.vfs().contains(&name) {
                bail!("file not found: {}", name.trim());
            }
            workspace.set_active(&name);
            if let Some(active) = workspace.active_name() {
                println!("{} {}", active, language_for(active));
            }
        }
        Commands::Write { name, content } => {
            let content = match content {
                Some(c) => c,
                None => read_stdin()?,
            };
            workspace.set_content(&name, &content)?;
            workspace.save().await?;
        }
        Commands::Preview => {
            println!("{}", serde_json::to_string_pretty(&workspace.preview_bundle())?);
        }
        Commands::Export { output } => {
            let archive = workspace.export_archive()?;
            std::fs::write(&output, archive)
                .with_context(|| format!("cannot write {}", output.display()))?;
        }
        Commands::Import { archive } => {
            let data = std::fs::read(&archive)
                .with_context(|| format!("cannot read {}", archive.display()))?;
            let created = workspace.import_archive(&data).await?;
            if created.is_empty() {
                bail!("no new files in {}", archive.display());
            }
            workspace.save().await?;
        }
        Commands::Reset => {
            workspace.reset().await?;
        }
    }

    Ok(())
}
