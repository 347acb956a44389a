use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ProfileCommands {
    #[command(subcommand)]
    pub command: ProfileSubcommands,
}

#[derive(Subcommand)]
pub enum ProfileSubcommands {
    /// Add a backend profile
    Add {
        /// Name for this profile (e.g., "production", "staging")
        #[arg(short, long)]
        name: Option<String>,
        /// Project URL of the backend
        #[arg(long)]
        url: Option<String>,
        /// Public API key of the project
        #[arg(long)]
        api_key: Option<String>,
        /// Import credentials from FORMSMITH_URL / FORMSMITH_API_KEY
        #[arg(long)]
        from_env: bool,
        /// Import credentials from the specified .env file
        #[arg(long)]
        from_env_file: Option<String>,
    },
    /// List configured profiles
    List,
    /// Select the current profile
    Use {
        /// Profile name to select
        name: Option<String>,
    },
    /// Remove a profile
    Remove {
        /// Profile name to remove
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}
