use anyhow::Context;
use clap::Parser;
use guide_cli::{commands, logging, Cli, Commands};
use guide_core::ENV_API_KEY;
use guide_tutorial::OpenAiChatModel;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_json) {
        eprintln!("warning: {e}");
    }

    if let Err(e) = run(cli.command).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();

    match command {
        Commands::Inspect { file, json, config } => {
            commands::inspect(&file, json, config.as_deref(), &mut stdout).await
        }
        Commands::Tutorial {
            file,
            config,
            timeout,
            out,
            export,
        } => {
            let config = commands::load_config(config.as_deref(), timeout)?;
            let model = OpenAiChatModel::new(config.model.clone()).with_context(|| {
                format!("set {ENV_API_KEY} or model.api_key in the config file")
            })?;
            tracing::info!(
                version = guide_cli::VERSION,
                model = %config.model.model,
                "starting tutorial synthesis"
            );
            commands::tutorial(&file, config, Arc::new(model), out.as_deref(), export, &mut stdout)
                .await
        }
        Commands::Extract { file, md5ext, out } => commands::extract(&file, &md5ext, &out).await,
        Commands::ExtractAll { file, out } => commands::extract_all(&file, &out).await,
        Commands::Validate { response } => commands::validate(&response, &mut stdout).await,
    }
}
