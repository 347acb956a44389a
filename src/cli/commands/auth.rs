use clap::{Args, Subcommand};

#[derive(Args)]
pub struct AuthCommands {
    #[command(subcommand)]
    pub command: AuthSubcommands,
}

#[derive(Subcommand)]
pub enum AuthSubcommands {
    /// Sign in to the current profile with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: Option<String>,
        /// Account password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show current profile and session
    Status,
}
