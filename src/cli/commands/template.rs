use crate::editor::QuestionType;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args)]
pub struct TemplateCommands {
    #[command(subcommand)]
    pub command: TemplateSubcommands,
}

#[derive(Subcommand)]
pub enum TemplateSubcommands {
    /// Start a new local draft
    New {
        /// Template title
        title: String,
        /// Template description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Make the template public
        #[arg(long)]
        public: bool,
        /// Draft file to create
        #[arg(short, long, default_value = "template.json")]
        file: PathBuf,
        /// Overwrite an existing draft file
        #[arg(long)]
        force: bool,
    },
    /// Append a question to a draft
    AddQuestion {
        /// Question type: text, textarea, number, checkbox or radio
        #[arg(value_parser = clap::value_parser!(QuestionType))]
        kind: QuestionType,
        /// Question title
        title: String,
        /// Question description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Answer option (repeatable)
        #[arg(short, long = "option")]
        options: Vec<String>,
        /// Draft file
        #[arg(short, long, default_value = "template.json")]
        file: PathBuf,
    },
    /// Append an answer option to a question of a draft
    AddOption {
        /// Question number (1-based, as shown by 'template show')
        question: usize,
        /// Option text
        value: String,
        /// Mark the option as checked by default
        #[arg(long)]
        checked: bool,
        /// Draft file
        #[arg(short, long, default_value = "template.json")]
        file: PathBuf,
    },
    /// Move a question to another position
    MoveQuestion {
        /// Question number to move (1-based)
        from: usize,
        /// Target position (1-based)
        to: usize,
        /// Draft file
        #[arg(short, long, default_value = "template.json")]
        file: PathBuf,
    },
    /// Remove a question from a draft
    RemoveQuestion {
        /// Question number (1-based)
        question: usize,
        /// Draft file
        #[arg(short, long, default_value = "template.json")]
        file: PathBuf,
    },
    /// Print a draft
    Show {
        /// Draft file
        #[arg(short, long, default_value = "template.json")]
        file: PathBuf,
    },
    /// Save a draft to the backend (insert when new, update otherwise)
    Push {
        /// Draft file
        #[arg(short, long, default_value = "template.json")]
        file: PathBuf,
    },
    /// Fetch a stored template into a local draft
    Pull {
        /// Template id
        id: String,
        /// Draft file to write
        #[arg(short, long, default_value = "template.json")]
        file: PathBuf,
        /// Overwrite an existing draft file
        #[arg(long)]
        force: bool,
    },
    /// List templates owned by the signed-in user
    List,
    /// Delete a stored template with its questions, options and answers
    Delete {
        /// Template id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}
