//! REST-backed member directory
//!
//! Implements the domain's `MemberDirectory` port over the Discord HTTP API.
//! Everything here is a live read; nothing is cached, because sync, progress
//! and aggregation all require current platform state.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serenity::all::{CreateMessage, GuildId, Member, Timestamp, UserId};
use serenity::http::{Http, HttpError};

use roster_core::{DirectoryMember, DomainError, MemberDirectory, Snowflake};

/// Discord's member-listing page size
const MEMBER_PAGE: u64 = 1000;

/// Convert a raw Discord ID into the domain's snowflake type
pub fn sf(id: u64) -> Snowflake {
    Snowflake::new(id as i64)
}

/// `MemberDirectory` over the Discord REST API
pub struct RestDirectory {
    http: Arc<Http>,
}

impl RestDirectory {
    /// Create a new RestDirectory sharing the given HTTP client
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn platform_error(e: serenity::Error) -> DomainError {
    DomainError::PlatformUnavailable(e.to_string())
}

fn is_not_found(e: &serenity::Error) -> bool {
    matches!(
        e,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp))
            if resp.status_code.as_u16() == 404
    )
}

fn timestamp_to_utc(ts: Timestamp) -> DateTime<Utc> {
    Utc.timestamp_opt(ts.unix_timestamp(), 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Project a serenity member into the domain's view of it
pub fn directory_member(member: &Member) -> DirectoryMember {
    DirectoryMember {
        user_id: Snowflake::new(member.user.id.get() as i64),
        display_name: member.display_name().to_string(),
        avatar_url: member.avatar_url().or_else(|| member.user.avatar_url()),
        is_service_account: member.user.bot || member.user.system,
        is_booster: member.premium_since.is_some(),
        role_ids: member
            .roles
            .iter()
            .map(|role_id| Snowflake::new(role_id.get() as i64))
            .collect(),
        joined_at: member.joined_at.map(timestamp_to_utc),
    }
}

#[async_trait]
impl MemberDirectory for RestDirectory {
    async fn guild_members(
        &self,
        guild_id: Snowflake,
    ) -> Result<Vec<DirectoryMember>, DomainError> {
        let guild = GuildId::new(guild_id.into_inner() as u64);

        let mut members = Vec::new();
        let mut after: Option<UserId> = None;
        loop {
            let page = guild
                .members(&self.http, Some(MEMBER_PAGE), after)
                .await
                .map_err(platform_error)?;

            let page_len = page.len() as u64;
            members.extend(page.iter().map(directory_member));

            if page_len < MEMBER_PAGE {
                break;
            }
            after = page.last().map(|member| member.user.id);
        }

        Ok(members)
    }

    async fn member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<Option<DirectoryMember>, DomainError> {
        let guild = GuildId::new(guild_id.into_inner() as u64);
        let user = UserId::new(user_id.into_inner() as u64);

        match guild.member(&self.http, user).await {
            Ok(member) => Ok(Some(directory_member(&member))),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(platform_error(e)),
        }
    }

    async fn role_names(
        &self,
        guild_id: Snowflake,
    ) -> Result<HashMap<Snowflake, String>, DomainError> {
        let guild = GuildId::new(guild_id.into_inner() as u64);

        let roles = guild.roles(&self.http).await.map_err(platform_error)?;

        Ok(roles
            .into_iter()
            .map(|(role_id, role)| (Snowflake::new(role_id.get() as i64), role.name))
            .collect())
    }

    async fn notify(&self, user_id: Snowflake, message: &str) -> Result<(), DomainError> {
        let user = UserId::new(user_id.into_inner() as u64);

        let channel = user
            .create_dm_channel(&self.http)
            .await
            .map_err(platform_error)?;
        channel
            .id
            .send_message(&self.http, CreateMessage::new().content(message))
            .await
            .map_err(platform_error)?;

        Ok(())
    }
}
