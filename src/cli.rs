use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mailrotor", about = "Disposable account store and rotation")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show account counts and the active session
    Status,
    /// List stored accounts in rotation order
    List,
    /// Show which account would be handed out next, without applying it
    Next {
        /// Continue after this account instead of the most recently used one
        #[arg(short, long)]
        after: Option<String>,
    },
    /// Select the next account and make it the active session
    Select {
        /// Continue after this account instead of the most recently used one
        #[arg(short, long)]
        after: Option<String>,
    },
    /// Add an account by hand
    Add {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        token: String,

        /// Usage quota descriptor
        #[arg(short, long, default_value = "unknown")]
        quota: String,
    },
    /// Mark an account as used
    MarkUsed {
        email: String,
    },
    /// Export accounts as plain text
    Export {
        /// Output file (defaults to store.export_file from the config)
        #[arg(short, long)]
        output: Option<String>,
    },
}
