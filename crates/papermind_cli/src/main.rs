use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use papermind::{ChatController, ChatSession, SessionConfig};
use papermind_api::{ApiClient, DeleteFileRequest, RegisterRequest};
use papermind_cli::chat::{run_repl, StreamPrinter};
use papermind_cli::cli::{Cli, Commands};
use papermind_cli::config::ClientConfig;
use papermind_cli::{crud, providers};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "PAPERMIND_LOG";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .init();

    match cli.command {
        Commands::Chat { namespace } => run_chat(cli.config.as_deref(), namespace),
        command => {
            let config = ClientConfig::resolve(cli.config.as_deref())?;
            let client = ApiClient::new(config.api_config())
                .context("failed to build PaperMind client")?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            let output = runtime.block_on(run_rest_command(&client, command))?;
            print!("{output}");
            Ok(())
        }
    }
}

fn run_chat(config_path: Option<&Path>, namespace: Option<String>) -> Result<()> {
    let provider = providers::provider_from_env(config_path).map_err(|error| anyhow!(error))?;
    info!(provider = %provider.profile().provider_id, "starting chat");

    let out = Arc::new(Mutex::new(io::stdout()));
    let controller = ChatController::new(
        ChatSession::new(SessionConfig::from_env(), namespace),
        provider,
        Arc::new(StreamPrinter::new(Arc::clone(&out))),
    );

    run_repl(&controller, io::stdin().lock(), &out).context("chat session failed")
}

async fn run_rest_command(client: &ApiClient, command: Commands) -> Result<String> {
    match command {
        Commands::Bots { page } => crud::list_bots(client, page).await,
        Commands::BotCreate { name, description } => {
            crud::create_bot(client, &name, &description).await
        }
        Commands::Files { bot, page } => crud::list_files(client, &bot, page).await,
        Commands::Upload {
            bot,
            namespace,
            path,
        } => crud::upload(client, &bot, &namespace, &path).await,
        Commands::FileDelete {
            id,
            name,
            namespace,
        } => {
            let request = DeleteFileRequest {
                id,
                name,
                namespace_id: namespace,
            };
            crud::delete_file(client, &request).await
        }
        Commands::Login { email, password } => crud::login(client, &email, &password).await,
        Commands::Register {
            name,
            email,
            phone,
            company,
            password,
        } => {
            let request = RegisterRequest {
                name,
                email,
                phone_number: phone,
                company_name: company,
                password,
            };
            crud::register(client, request).await
        }
        Commands::Chat { .. } => Err(anyhow!("chat is not a REST command")),
    }
}
