//! /bind - link your VRChat display name

use roster_core::PersonId;
use roster_service::{BindingService, ServiceContext, ServiceResult};
use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, ResolvedOption, User,
};

use crate::directory::sf;

use super::str_opt;

pub fn register() -> CreateCommand {
    CreateCommand::new("bind")
        .description("Link your VRChat display name to your Discord account")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "name", "Your VRChat display name")
                .required(true),
        )
}

pub async fn run(
    services: &ServiceContext,
    guild: roster_core::Snowflake,
    user: &User,
    options: &[ResolvedOption<'_>],
) -> ServiceResult<String> {
    let raw_name = str_opt(options, "name").unwrap_or_default();
    let person = PersonId::Platform(sf(user.id.get()));

    let outcome = BindingService::new(services).bind(guild, person, raw_name).await?;

    let reply = if outcome.was_new_binding {
        format!(
            "Linked your VRChat name: **{}**. You now show up on the sponsor roster.",
            outcome.binding.current_name
        )
    } else if let Some(change) = outcome
        .binding
        .history
        .first()
        .filter(|change| change.changed_at == outcome.binding.updated_at)
    {
        format!(
            "Updated your VRChat name: **{}** → **{}**.",
            change.previous_name, outcome.binding.current_name
        )
    } else {
        format!(
            "Your VRChat name is still **{}**; nothing changed.",
            outcome.binding.current_name
        )
    };

    Ok(reply)
}
