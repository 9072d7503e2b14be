//! /profile - show a member's binding and name history

use chrono::Utc;
use roster_common::AppConfig;
use roster_core::PersonId;
use roster_service::{BindingService, ServiceContext, ServiceResult};
use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, ResolvedOption, User,
};

use crate::directory::sf;

use super::user_opt;

pub fn register() -> CreateCommand {
    CreateCommand::new("profile")
        .description("Show a member's VRChat binding")
        .add_option(CreateCommandOption::new(
            CommandOptionType::User,
            "user",
            "Whose profile to show (defaults to you)",
        ))
}

pub async fn run(
    services: &ServiceContext,
    config: &AppConfig,
    guild: roster_core::Snowflake,
    invoker: &User,
    options: &[ResolvedOption<'_>],
) -> ServiceResult<String> {
    let target = user_opt(options, "user").unwrap_or(invoker);
    let person = PersonId::Platform(sf(target.id.get()));

    let Some(binding) = BindingService::new(services).profile(guild, &person).await? else {
        return Ok(format!("<@{}> has not linked a VRChat name yet.", target.id));
    };

    let mut reply = format!(
        "<@{}> is bound to **{}** (for {} days).",
        target.id,
        binding.current_name,
        binding.bound_days(Utc::now())
    );

    if !binding.history.is_empty() {
        reply.push_str("\nPrevious names:");
        for change in &binding.history {
            reply.push_str(&format!(
                "\n• {} (until {})",
                change.previous_name,
                change.changed_at.format("%Y-%m-%d")
            ));
        }
    }

    if let Some(base) = &config.api.public_base_url {
        reply.push_str(&format!("\nRoster: {base}/api/vrchat/sponsors/{guild}"));
    }

    Ok(reply)
}
