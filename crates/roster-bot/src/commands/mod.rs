//! Slash command surface
//!
//! Every command is a thin wrapper over one service operation; all replies
//! are ephemeral and every failure becomes a reply, never a crash. Admin
//! commands are double-gated: declaratively via default member permissions
//! and again at dispatch time.

pub mod bind;
pub mod external;
pub mod guild;
pub mod profile;
pub mod roster_admin;
pub mod sponsor;

use roster_common::AppConfig;
use roster_service::{ServiceContext, ServiceResult};
use serenity::all::{CommandInteraction, Context, CreateCommand, ResolvedOption, ResolvedValue};
use tracing::warn;

use crate::directory::sf;

/// Commands that require Manage Server (checked again here, not only in the
/// registration's default permissions)
const ADMIN_COMMANDS: &[&str] = &[
    "sync", "refresh", "unbind", "search", "sponsor", "external", "config",
];

/// All command registrations, pushed globally on ready
pub fn registrations() -> Vec<CreateCommand> {
    vec![
        bind::register(),
        profile::register(),
        roster_admin::register_progress(),
        roster_admin::register_sync(),
        roster_admin::register_refresh(),
        roster_admin::register_unbind(),
        roster_admin::register_search(),
        sponsor::register(),
        external::register(),
        guild::register(),
    ]
}

/// Route an interaction to its command and render the reply text
pub async fn dispatch(
    _ctx: &Context,
    command: &CommandInteraction,
    services: &ServiceContext,
    config: &AppConfig,
) -> String {
    let Some(guild_id) = command.guild_id else {
        return "This command only works in a server.".to_string();
    };
    let guild = sf(guild_id.get());
    let name = command.data.name.as_str();

    if ADMIN_COMMANDS.contains(&name) && !is_admin(command) {
        return "You need the Manage Server permission to use this command.".to_string();
    }

    let options = command.data.options();
    let result: ServiceResult<String> = match name {
        "bind" => bind::run(services, guild, &command.user, &options).await,
        "profile" => profile::run(services, config, guild, &command.user, &options).await,
        "progress" => roster_admin::progress(services, guild).await,
        "sync" => roster_admin::sync(services, guild).await,
        "refresh" => roster_admin::refresh(services, guild),
        "unbind" => roster_admin::unbind(services, guild, &options).await,
        "search" => roster_admin::search(services, guild, &options).await,
        "sponsor" => sponsor::run(services, guild, &command.user, &options).await,
        "external" => external::run(services, guild, &command.user, &options).await,
        "config" => guild::run(services, guild, &command.user, &options).await,
        _ => Ok("Unknown command.".to_string()),
    };

    match result {
        Ok(reply) => reply,
        Err(e) => {
            if e.status_code() >= 500 {
                warn!(
                    command = name,
                    actor = %command.user.id,
                    guild = %guild_id,
                    error = %e,
                    "Command failed"
                );
            }
            e.user_message()
        }
    }
}

fn is_admin(command: &CommandInteraction) -> bool {
    command
        .member
        .as_ref()
        .and_then(|member| member.permissions)
        .is_some_and(|perms| perms.administrator() || perms.manage_guild())
}

// ============================================================================
// Option parsing helpers
// ============================================================================

pub(crate) fn str_opt<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a str> {
    options.iter().find(|o| o.name == name).and_then(|o| match &o.value {
        ResolvedValue::String(s) => Some(*s),
        _ => None,
    })
}

pub(crate) fn user_opt<'a>(
    options: &'a [ResolvedOption<'a>],
    name: &str,
) -> Option<&'a serenity::all::User> {
    options.iter().find(|o| o.name == name).and_then(|o| match &o.value {
        ResolvedValue::User(user, _) => Some(*user),
        _ => None,
    })
}

pub(crate) fn role_opt<'a>(
    options: &'a [ResolvedOption<'a>],
    name: &str,
) -> Option<&'a serenity::all::Role> {
    options.iter().find(|o| o.name == name).and_then(|o| match &o.value {
        ResolvedValue::Role(role) => Some(*role),
        _ => None,
    })
}

pub(crate) fn bool_opt(options: &[ResolvedOption<'_>], name: &str) -> Option<bool> {
    options.iter().find(|o| o.name == name).and_then(|o| match &o.value {
        ResolvedValue::Boolean(b) => Some(*b),
        _ => None,
    })
}

/// The invoked subcommand and its nested options
pub(crate) fn sub_command<'a>(
    options: &'a [ResolvedOption<'a>],
) -> Option<(&'a str, &'a [ResolvedOption<'a>])> {
    options.iter().find_map(|o| match &o.value {
        ResolvedValue::SubCommand(nested) => Some((o.name, nested.as_slice())),
        _ => None,
    })
}

/// Split a comma-separated role list into trimmed names
pub(crate) fn split_roles(raw: &str) -> Vec<String> {
    raw.split(',').map(|part| part.trim().to_string()).collect()
}
