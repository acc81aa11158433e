use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use cleansource_cli::cli::{Cli, Commands};
use cleansource_cli::commands::{self, load_config};
use cleansource_cli::error::CliError;
use cleansource_cli::logging::init_tracing;
use cleansource_cli::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    // config validate는 로딩 실패 자체를 보고하므로 로깅 설정 이전에 처리
    let command = match cli.command {
        Commands::Config(args) => {
            return commands::config::execute(args, &cli.config, &writer).await;
        }
        command => command,
    };

    let mut config = load_config(&cli.config).await?;
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
        config.validate()?;
    }
    init_tracing(&config.general).map_err(|e| CliError::Command(format!("{e:#}")))?;
    cleansource_core::metrics::describe_all();

    tracing::info!(config = %cli.config.display(), "cleansource starting");

    match command {
        Commands::Scan(args) => commands::scan::execute(args, &config, &writer).await,
        Commands::Fingerprint(args) => {
            commands::fingerprint::execute(args, &config, &writer).await
        }
        Commands::Detect(args) => commands::detect::execute(args, &writer).await,
        Commands::Config(_) => Ok(()),
    }
}
