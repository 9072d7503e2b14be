//! Admin roster commands: /progress, /sync, /refresh, /unbind, /search

use roster_core::PersonId;
use roster_service::{
    AggregationService, BindingService, ProgressService, ServiceContext, ServiceResult,
    SponsorService, SyncService,
};
use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, Permissions, ResolvedOption,
};

use crate::directory::sf;

use super::{str_opt, user_opt};

/// How many search hits a reply lists before truncating
const SEARCH_DISPLAY_CAP: usize = 10;

pub fn register_progress() -> CreateCommand {
    CreateCommand::new("progress").description("How many sponsors have linked their VRChat name")
}

pub fn register_sync() -> CreateCommand {
    CreateCommand::new("sync")
        .description("Reconcile all managed-role holders into the roster")
        .default_member_permissions(Permissions::MANAGE_GUILD)
}

pub fn register_refresh() -> CreateCommand {
    CreateCommand::new("refresh")
        .description("Clear the cached roster so the API re-aggregates")
        .default_member_permissions(Permissions::MANAGE_GUILD)
}

pub fn register_unbind() -> CreateCommand {
    CreateCommand::new("unbind")
        .description("Remove a member's VRChat binding")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .add_option(
            CreateCommandOption::new(CommandOptionType::User, "user", "Whose binding to remove")
                .required(true),
        )
}

pub fn register_search() -> CreateCommand {
    CreateCommand::new("search")
        .description("Search bound VRChat names")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "query", "Part of a VRChat name")
                .required(true),
        )
}

pub async fn progress(
    services: &ServiceContext,
    guild: roster_core::Snowflake,
) -> ServiceResult<String> {
    let progress = ProgressService::new(services).progress(guild).await?;
    Ok(format!(
        "Binding progress: {}/{} managed-role holders linked ({}%).",
        progress.bound, progress.total, progress.percentage
    ))
}

pub async fn sync(
    services: &ServiceContext,
    guild: roster_core::Snowflake,
) -> ServiceResult<String> {
    let report = SyncService::new(services).sync_managed_members(guild).await?;
    Ok(format!(
        "Sync finished: {} added, {} updated, {} retired.",
        report.upserted, report.modified, report.retired
    ))
}

pub fn refresh(services: &ServiceContext, guild: roster_core::Snowflake) -> ServiceResult<String> {
    AggregationService::new(services).refresh(guild);
    Ok("Roster cache cleared; the next API call re-aggregates.".to_string())
}

pub async fn unbind(
    services: &ServiceContext,
    guild: roster_core::Snowflake,
    options: &[ResolvedOption<'_>],
) -> ServiceResult<String> {
    let Some(target) = user_opt(options, "user") else {
        return Ok("Pick a user to unbind.".to_string());
    };
    let person = PersonId::Platform(sf(target.id.get()));

    match BindingService::new(services).unbind(guild, &person).await? {
        Some(report) => Ok(format!(
            "Removed binding **{}** for <@{}> (was bound for {} days).",
            report.vrchat_name, target.id, report.bound_days
        )),
        None => Ok(format!("<@{}> has no binding.", target.id)),
    }
}

pub async fn search(
    services: &ServiceContext,
    guild: roster_core::Snowflake,
    options: &[ResolvedOption<'_>],
) -> ServiceResult<String> {
    let query = str_opt(options, "query").unwrap_or_default();
    let hits = SponsorService::new(services).search(guild, query).await?;

    if hits.is_empty() {
        return Ok(format!("No bound names match `{query}`."));
    }

    let mut reply = format!("{} match(es) for `{query}`:", hits.len());
    for hit in hits.iter().take(SEARCH_DISPLAY_CAP) {
        let who = match hit.binding.person.as_platform() {
            Some(user_id) => format!("<@{user_id}>"),
            None => format!("`{}`", hit.binding.person),
        };
        reply.push_str(&format!("\n• **{}** — {who}", hit.binding.current_name));
    }
    if hits.len() > SEARCH_DISPLAY_CAP {
        reply.push_str(&format!("\n…and {} more.", hits.len() - SEARCH_DISPLAY_CAP));
    }

    Ok(reply)
}
