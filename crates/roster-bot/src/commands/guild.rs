//! /config - guild configuration: managed roles, API switch, notifications

use roster_core::GuildConfig;
use roster_service::{GuildConfigService, ServiceContext, ServiceResult};
use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, Permissions, ResolvedOption, User,
};

use crate::directory::sf;

use super::{bool_opt, role_opt, sub_command, user_opt};

pub fn register() -> CreateCommand {
    CreateCommand::new("config")
        .description("Configure the sponsor roster for this server")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "role-add",
                "Add a role that gates the binding feature",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::Role, "role", "Role to manage")
                    .required(true),
            ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "role-remove",
                "Stop managing a role",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::Role, "role", "Role to drop")
                    .required(true),
            ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "api",
                "Switch the public roster API on or off",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::Boolean, "enabled", "Serve the API?")
                    .required(true),
            ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "notify",
                "Who gets a DM on binding changes (omit the user to clear)",
            )
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::User,
                "user",
                "Notification target",
            )),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "show",
            "Show the current configuration",
        ))
}

pub async fn run(
    services: &ServiceContext,
    guild: roster_core::Snowflake,
    invoker: &User,
    options: &[ResolvedOption<'_>],
) -> ServiceResult<String> {
    let service = GuildConfigService::new(services);

    // Guilds added before the bot tracked configs get one lazily
    service.ensure(guild, sf(invoker.id.get())).await?;

    match sub_command(options) {
        Some(("role-add", nested)) => {
            let Some(role) = role_opt(nested, "role") else {
                return Ok("Pick a role.".to_string());
            };
            let config = service.add_managed_role(guild, sf(role.id.get())).await?;
            Ok(format!(
                "Now managing **{}**. {}",
                role.name,
                gate_summary(&config)
            ))
        }
        Some(("role-remove", nested)) => {
            let Some(role) = role_opt(nested, "role") else {
                return Ok("Pick a role.".to_string());
            };
            let config = service.remove_managed_role(guild, sf(role.id.get())).await?;
            Ok(format!(
                "No longer managing **{}**. {}",
                role.name,
                gate_summary(&config)
            ))
        }
        Some(("api", nested)) => {
            let enabled = bool_opt(nested, "enabled").unwrap_or(true);
            service.set_api_enabled(guild, enabled).await?;
            Ok(if enabled {
                "Roster API enabled.".to_string()
            } else {
                "Roster API disabled; requests now get 403.".to_string()
            })
        }
        Some(("notify", nested)) => match user_opt(nested, "user") {
            Some(target) => {
                service.set_notify_target(guild, sf(target.id.get())).await?;
                Ok(format!("<@{}> now receives binding notifications.", target.id))
            }
            None => {
                service.clear_notify_target(guild).await?;
                Ok("Binding notifications disabled.".to_string())
            }
        },
        Some(("show", _)) => {
            let config = service.get(guild).await?;
            Ok(render_config(&config))
        }
        _ => Ok("Pick a subcommand.".to_string()),
    }
}

fn gate_summary(config: &GuildConfig) -> &'static str {
    if config.binding_enabled() {
        "Binding is enabled."
    } else {
        "Binding is now disabled (no managed roles)."
    }
}

fn render_config(config: &GuildConfig) -> String {
    let roles = if config.managed_role_ids.is_empty() {
        "none (binding disabled)".to_string()
    } else {
        config
            .managed_role_ids
            .iter()
            .map(|id| format!("<@&{id}>"))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let notify = config
        .notify_user_id
        .map_or_else(|| "off".to_string(), |id| format!("<@{id}>"));

    let last_sync = config
        .last_sync_at
        .map_or_else(|| "never".to_string(), |at| at.format("%Y-%m-%d %H:%M UTC").to_string());

    format!(
        "Managed roles: {roles}\nAPI: {}\nNotifications: {notify}\nLast sync: {last_sync}",
        if config.api_enabled { "on" } else { "off" },
    )
}
