//! Write the OpenAPI documents of both services as JSON.
//!
//! With `--out-dir` each document lands in its own file; otherwise the
//! selected document is printed to stdout.

use std::io::Write as _;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use lvhub::doc::{AdventureApiDoc, VetBotApiDoc};
use utoipa::OpenApi;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Service {
    VetBot,
    Adventure,
}

impl Service {
    fn document(self) -> utoipa::openapi::OpenApi {
        match self {
            Self::VetBot => VetBotApiDoc::openapi(),
            Self::Adventure => AdventureApiDoc::openapi(),
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            Self::VetBot => "vet-bot.openapi.json",
            Self::Adventure => "adventure-api.openapi.json",
        }
    }
}

/// `openapi-dump` command arguments.
#[derive(Debug, Parser)]
#[command(name = "openapi-dump", about = "Export the OpenAPI documents", version)]
struct CliArgs {
    /// Document printed to stdout when no output directory is given.
    #[arg(long, value_enum, default_value = "vet-bot")]
    service: Service,
    /// Write both documents into this directory.
    #[arg(long = "out-dir", value_name = "path")]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();

    let Some(dir) = args.out_dir else {
        let json = args
            .service
            .document()
            .to_pretty_json()
            .wrap_err("serialise OpenAPI document")?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}").wrap_err("write to stdout")?;
        return Ok(());
    };

    std::fs::create_dir_all(&dir).wrap_err_with(|| format!("create {}", dir.display()))?;
    for service in [Service::VetBot, Service::Adventure] {
        let json = service
            .document()
            .to_pretty_json()
            .wrap_err("serialise OpenAPI document")?;
        let path = dir.join(service.file_name());
        std::fs::write(&path, json).wrap_err_with(|| format!("write {}", path.display()))?;
    }
    Ok(())
}
