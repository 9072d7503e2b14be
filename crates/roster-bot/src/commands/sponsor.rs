//! /sponsor - manual sponsor management

use roster_core::{DomainError, PersonId};
use roster_service::{ServiceContext, ServiceResult, SponsorService};
use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, Permissions, ResolvedOption, User,
};

use crate::directory::sf;

use super::{split_roles, str_opt, sub_command, user_opt};

pub fn register() -> CreateCommand {
    CreateCommand::new("sponsor")
        .description("Manage manually-entered sponsors")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommand, "add", "Add a manual sponsor")
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "roles",
                        "Comma-separated role names (e.g. Gold, VIP)",
                    )
                    .required(true),
                )
                .add_sub_option(CreateCommandOption::new(
                    CommandOptionType::User,
                    "user",
                    "Link to a Discord account (otherwise a synthetic ID is generated)",
                ))
                .add_sub_option(CreateCommandOption::new(
                    CommandOptionType::String,
                    "display_name",
                    "Display name for the roster",
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
                "Remove a sponsor and their binding",
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "person",
                    "Person ID (Discord ID or generated m_… ID)",
                )
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
    match sub_command(options) {
        Some(("add", nested)) => add(services, guild, invoker, nested).await,
        Some(("remove", nested)) => remove(services, guild, nested).await,
        _ => Ok("Pick a subcommand.".to_string()),
    }
}

async fn add(
    services: &ServiceContext,
    guild: roster_core::Snowflake,
    invoker: &User,
    options: &[ResolvedOption<'_>],
) -> ServiceResult<String> {
    let roles = split_roles(str_opt(options, "roles").unwrap_or_default());
    let person = user_opt(options, "user").map(|user| PersonId::Platform(sf(user.id.get())));
    let display_name = str_opt(options, "display_name").map(str::to_string);
    let notes = str_opt(options, "notes").map(str::to_string);

    let sponsor = SponsorService::new(services)
        .add_manual(guild, person, roles, display_name, notes, sf(invoker.id.get()))
        .await?;

    let shown = sponsor
        .display_name
        .clone()
        .unwrap_or_else(|| sponsor.person.to_string());
    Ok(format!(
        "Added manual sponsor **{shown}** (ID `{}`).",
        sponsor.person
    ))
}

async fn remove(
    services: &ServiceContext,
    guild: roster_core::Snowflake,
    options: &[ResolvedOption<'_>],
) -> ServiceResult<String> {
    let raw = str_opt(options, "person").unwrap_or_default().trim().to_string();
    let person = PersonId::parse(&raw)
        .map_err(|_| DomainError::InvalidId(raw.clone()))?;

    let report = SponsorService::new(services).remove_person(guild, &person).await?;
    if !report.any() {
        return Ok(format!("No sponsor record or binding for `{person}`."));
    }

    let mut removed = Vec::new();
    if report.sponsor_removed {
        removed.push("sponsor record");
    }
    if report.binding_removed {
        removed.push("binding");
    }
    Ok(format!("Removed {} for `{person}`.", removed.join(" and ")))
}
