mod cli;

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Commands};
use serde_json::json;

use shiori_core::config::{Layout, Settings};
use shiori_core::error::ConfigError;
use shiori_core::request::ListField;
use shiori_core::resolver::BlockConfig;
use shiori_runtime::{Runtime, RuntimeError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "shiori=trace".to_string()
        } else {
            "shiori=info".to_string()
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String, RuntimeError> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    let runtime = Runtime::from_settings(&settings)?;

    let output = match cli.command {
        Commands::Block { input } => {
            let text = read_block(&input)?;
            let block = BlockConfig::parse(&text);
            let layout = runtime.resolver().layout_for(&block)?;
            let request = runtime.resolver().resolve_block(&block)?;
            tracing::debug!(key = %request.cache_key(), ?layout, "Resolved block");
            let data = runtime.fetch(&request).await?;
            json!({ "layout": layout, "data": &*data })
        }
        Commands::Link { href } => {
            let request = runtime.resolve_link(&href)?;
            let data = runtime.fetch(&request).await?;
            json!({ "layout": Layout::Card, "data": &*data })
        }
        Commands::Search {
            term,
            manga,
            page,
            per_page,
        } => {
            let mut block = BlockConfig::default()
                .with("mediaType", if manga { "MANGA" } else { "ANIME" });
            if let Some(page) = page {
                block = block.with("page", page.to_string());
            }
            if let Some(per_page) = per_page {
                block = block.with("perPage", per_page.to_string());
            }
            let request = runtime.resolver().resolve_search(&block, &term)?;
            let data = runtime.fetch(&request).await?;
            json!(&*data)
        }
        Commands::Update {
            media_id,
            status,
            score,
            progress,
        } => {
            let field = match (status, score, progress) {
                (Some(status), _, _) => ListField::Status(status),
                (_, Some(score), _) => ListField::Score(score),
                (_, _, Some(progress)) => ListField::Progress(progress),
                _ => return Err(ConfigError::MissingField("status, score or progress").into()),
            };
            let saved = runtime.mutate(media_id, field).await?;
            tracing::info!(media_id, field = field.name(), "List entry updated");
            json!(saved)
        }
    };

    Ok(format!("{output:#}"))
}

fn read_block(input: &Path) -> Result<String, ConfigError> {
    let mut text = String::new();
    if input == Path::new("-") {
        std::io::stdin().read_to_string(&mut text)?;
    } else {
        text = std::fs::read_to_string(input)?;
    }
    Ok(text)
}
