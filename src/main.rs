use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use heroku_tools::clap_parser::Args;
use heroku_tools::command_processor::CommandProcessor;
use heroku_tools::secrets::SecretsManager;
use heroku_tools::settings::SettingsManager;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", format!("Error: {:#}", error).red());
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over `-v`; logs go to stderr so command output stays clean.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let mut settings_manager = SettingsManager::new(args.settings.as_deref());
    let mut settings = settings_manager.load_settings().await?;

    if let Some(conf_dir) = args.conf_dir {
        settings.app_conf_dir = conf_dir;
    }
    if let Some(work_dir) = args.work_dir {
        settings.git_work_dir = work_dir;
    }
    settings.apply_environment(|key| std::env::var(key).ok());

    let secrets = SecretsManager::new(&settings);
    let processor = CommandProcessor::new(
        settings,
        secrets,
        settings_manager.source().map(|p| p.to_path_buf()),
    );
    processor.process_command(args.command).await
}
