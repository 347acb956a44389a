pub mod auth;
pub mod profile;
pub mod template;

pub use auth::{AuthCommands, AuthSubcommands};
pub use profile::{ProfileCommands, ProfileSubcommands};
pub use template::{TemplateCommands, TemplateSubcommands};
