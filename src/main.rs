use anyhow::Result;
use clap::Parser;
use log::info;

use formsmith::cli::commands::{AuthSubcommands, ProfileSubcommands, TemplateSubcommands};
use formsmith::cli::{Cli, Commands};
use formsmith::commands::{auth, profile, template};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    info!("Starting formsmith");

    match cli.command {
        Commands::Profile(profile_cmd) => match profile_cmd.command {
            ProfileSubcommands::Add {
                name,
                url,
                api_key,
                from_env,
                from_env_file,
            } => {
                profile::add_command(profile::AddOptions {
                    name,
                    url,
                    api_key,
                    from_env,
                    from_env_file,
                })
                .await
            }
            ProfileSubcommands::List => profile::list_command().await,
            ProfileSubcommands::Use { name } => profile::select_command(name).await,
            ProfileSubcommands::Remove { name, force } => profile::remove_command(name, force).await,
        },
        Commands::Auth(auth_cmd) => match auth_cmd.command {
            AuthSubcommands::Login { email, password } => auth::login_command(email, password).await,
            AuthSubcommands::Logout => auth::logout_command().await,
            AuthSubcommands::Status => auth::status_command().await,
        },
        Commands::Template(template_cmd) => match template_cmd.command {
            TemplateSubcommands::New {
                title,
                description,
                public,
                file,
                force,
            } => template::new_command(title, description, public, file, force).await,
            TemplateSubcommands::AddQuestion {
                kind,
                title,
                description,
                options,
                file,
            } => template::add_question_command(kind, title, description, options, file).await,
            TemplateSubcommands::AddOption {
                question,
                value,
                checked,
                file,
            } => template::add_option_command(question, value, checked, file).await,
            TemplateSubcommands::MoveQuestion { from, to, file } => {
                template::move_question_command(from, to, file).await
            }
            TemplateSubcommands::RemoveQuestion { question, file } => {
                template::remove_question_command(question, file).await
            }
            TemplateSubcommands::Show { file } => template::show_command(file).await,
            TemplateSubcommands::Push { file } => template::push_command(file).await,
            TemplateSubcommands::Pull { id, file, force } => template::pull_command(id, file, force).await,
            TemplateSubcommands::List => template::list_command().await,
            TemplateSubcommands::Delete { id, force } => template::delete_command(id, force).await,
        },
    }
}
