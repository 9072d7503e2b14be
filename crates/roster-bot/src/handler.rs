//! Gateway event handler
//!
//! Maps Discord events onto service operations. Every handler swallows its
//! errors into a log line: an isolated failure must never take the bot down.

use std::sync::Arc;

use async_trait::async_trait;
use roster_common::AppConfig;
use roster_core::PersonId;
use roster_service::{GuildConfigService, ServiceContext, SponsorService, SyncService};
use serenity::all::{
    Command, CommandInteraction, Context, EditInteractionResponse, EventHandler, Guild, GuildId,
    GuildMemberUpdateEvent, Interaction, Member, Ready, UnavailableGuild, User,
};
use tracing::{error, info, warn};

use crate::commands;
use crate::directory::{directory_member, sf};

/// Gateway event handler
pub struct Handler {
    services: ServiceContext,
    config: Arc<AppConfig>,
}

impl Handler {
    /// Create a new Handler
    pub fn new(services: ServiceContext, config: Arc<AppConfig>) -> Self {
        Self { services, config }
    }

    async fn handle_command(&self, ctx: &Context, command: &CommandInteraction) {
        // Ack first: syncing a large guild can blow the 3-second reply window
        if let Err(e) = command.defer_ephemeral(&ctx.http).await {
            warn!(command = %command.data.name, error = %e, "Failed to ack interaction");
            return;
        }

        let reply = commands::dispatch(ctx, command, &self.services, &self.config).await;

        if let Err(e) = command
            .edit_response(&ctx.http, EditInteractionResponse::new().content(reply))
            .await
        {
            warn!(command = %command.data.name, error = %e, "Failed to send reply");
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Gateway connected");

        match Command::set_global_commands(&ctx.http, commands::registrations()).await {
            Ok(registered) => info!(count = registered.len(), "Slash commands registered"),
            Err(e) => error!(error = %e, "Slash command registration failed"),
        }
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        let service = GuildConfigService::new(&self.services);
        if let Err(e) = service
            .ensure(sf(guild.id.get()), sf(guild.owner_id.get()))
            .await
        {
            warn!(guild = %guild.id, error = %e, "Guild registration failed");
        }
    }

    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        // An unavailable guild is an outage, not a removal
        if incomplete.unavailable {
            return;
        }

        let service = GuildConfigService::new(&self.services);
        if let Err(e) = service.delete_guild(sf(incomplete.id.get())).await {
            warn!(guild = %incomplete.id, error = %e, "Guild cascade failed");
        }
    }

    async fn guild_member_addition(&self, _ctx: Context, member: Member) {
        let guild = sf(member.guild_id.get());
        let snapshot = directory_member(&member);

        if let Err(e) = SyncService::new(&self.services).refresh_member(guild, &snapshot).await {
            warn!(%guild, user = %member.user.id, error = %e, "Member-add reconcile failed");
        }
    }

    async fn guild_member_removal(
        &self,
        _ctx: Context,
        guild_id: GuildId,
        user: User,
        _member: Option<Member>,
    ) {
        let guild = sf(guild_id.get());
        let person = PersonId::Platform(sf(user.id.get()));

        if let Err(e) = SponsorService::new(&self.services).remove_person(guild, &person).await {
            warn!(%guild, user = %user.id, error = %e, "Member-leave cleanup failed");
        }
    }

    async fn guild_member_update(
        &self,
        _ctx: Context,
        _old: Option<Member>,
        new: Option<Member>,
        event: GuildMemberUpdateEvent,
    ) {
        let guild = sf(event.guild_id.get());

        // Without the cache the full member is absent; fall back to a fetch
        let member = match new {
            Some(member) => Some(directory_member(&member)),
            None => {
                let user = sf(event.user.id.get());
                match self.services.directory().member(guild, user).await {
                    Ok(member) => member,
                    Err(e) => {
                        warn!(%guild, user = %event.user.id, error = %e, "Member fetch failed");
                        None
                    }
                }
            }
        };

        if let Some(member) = member {
            if let Err(e) = SyncService::new(&self.services).refresh_member(guild, &member).await {
                warn!(%guild, user = %event.user.id, error = %e, "Role-change reconcile failed");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.handle_command(&ctx, &command).await;
        }
    }
}
