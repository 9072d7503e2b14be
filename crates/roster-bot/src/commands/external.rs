//! /external - external sponsor management (no Discord account)

use roster_core::PersonId;
use roster_service::{ExternalSponsorService, ServiceContext, ServiceResult};
use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, Permissions, ResolvedOption, User,
};

use crate::directory::sf;

use super::{split_roles, str_opt, sub_command, user_opt};

pub fn register() -> CreateCommand {
    CreateCommand::new("external")
        .description("Manage sponsors without a Discord account")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "add",
                "Add an external sponsor by VRChat name",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "name", "VRChat name")
                    .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "roles",
                    "Comma-separated role names (e.g. Gold, VIP)",
                )
                .required(true),
            )
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::String,
                "display_name",
                "Display name for the roster",
            ))
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::User,
                "user",
                "Discord account to associate, if any",
            ))
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::String,
                "notes",
                "Internal notes",
            )),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "remove",
                "Remove an external sponsor",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "name", "VRChat name")
                    .required(true),
            ),
        )
}

pub async fn run(
    services: &ServiceContext,
    guild: roster_core::Snowflake,
    invoker: &User,
    options: &[ResolvedOption<'_>],
) -> ServiceResult<String> {
    let service = ExternalSponsorService::new(services);

    match sub_command(options) {
        Some(("add", nested)) => {
            let name = str_opt(nested, "name").unwrap_or_default();
            let roles = split_roles(str_opt(nested, "roles").unwrap_or_default());
            let display_name = str_opt(nested, "display_name").map(str::to_string);
            let notes = str_opt(nested, "notes").map(str::to_string);
            let linked = user_opt(nested, "user").map(|user| PersonId::Platform(sf(user.id.get())));

            let sponsor = service
                .add(guild, name, roles, display_name, notes, linked, sf(invoker.id.get()))
                .await?;

            Ok(format!(
                "Added external sponsor **{}** with roles {}.",
                sponsor.vrchat_name,
                sponsor.role_names.join(", ")
            ))
        }
        Some(("remove", nested)) => {
            let name = str_opt(nested, "name").unwrap_or_default();
            if service.remove(guild, name).await? {
                Ok(format!("Removed external sponsor **{}**.", name.trim()))
            } else {
                Ok(format!("No external sponsor named **{}**.", name.trim()))
            }
        }
        _ => Ok("Pick a subcommand.".to_string()),
    }
}
