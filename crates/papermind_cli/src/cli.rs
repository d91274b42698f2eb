use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "papermind")]
#[command(version, about = "Chat with PaperMind document bots")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON client config (base_url, access_token, timeouts)
    #[arg(long, global = true, env = "PAPERMIND_CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat with a bot
    Chat {
        /// Namespace of the bot's document index
        #[arg(long)]
        namespace: Option<String>,
    },

    /// List bots
    Bots {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Create a bot
    BotCreate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
    },

    /// List files uploaded to a bot
    Files {
        #[arg(long)]
        bot: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Upload a PDF to a bot
    Upload {
        #[arg(long)]
        bot: String,
        #[arg(long)]
        namespace: String,
        path: PathBuf,
    },

    /// Delete an uploaded file
    FileDelete {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        namespace: Option<String>,
    },

    /// Log in and print the issued token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        password: String,
    },
}
