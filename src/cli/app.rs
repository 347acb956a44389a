use super::commands::{AuthCommands, ProfileCommands, TemplateCommands};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "formsmith")]
#[command(about = "Author form templates and sync them with a hosted backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Backend profile management
    Profile(ProfileCommands),
    /// Sign in and out of the current profile
    Auth(AuthCommands),
    /// Edit local template drafts and sync them with the backend
    Template(TemplateCommands),
}
