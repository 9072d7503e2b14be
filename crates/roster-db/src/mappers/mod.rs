//! Model ↔ entity mappers
//!
//! Rows store person IDs as text and sponsor kinds as a tag column; these
//! conversions re-establish the typed forms and fail loudly on rows that do
//! not parse (which would mean the database was written by something else).

use roster_core::{
    Binding, DomainError, ExternalSponsor, GuildConfig, NameChange, PersonId, RepoResult,
    Snowflake, Sponsor, SponsorKind,
};

use crate::models::{
    BindingModel, ExternalSponsorModel, GuildConfigModel, NameChangeModel, SponsorModel,
};

/// Sponsor kind tag values in the `sponsors.kind` column
pub const KIND_PLATFORM: &str = "platform";
pub const KIND_MANUAL: &str = "manual";

fn parse_person(raw: &str) -> RepoResult<PersonId> {
    PersonId::parse(raw)
        .map_err(|_| DomainError::DatabaseError(format!("unparseable person id in row: {raw:?}")))
}

impl From<GuildConfigModel> for GuildConfig {
    fn from(model: GuildConfigModel) -> Self {
        Self {
            guild_id: Snowflake::new(model.guild_id),
            owner_id: Snowflake::new(model.owner_id),
            api_enabled: model.api_enabled,
            managed_role_ids: model.managed_role_ids.into_iter().map(Snowflake::new).collect(),
            notify_user_id: model.notify_user_id.map(Snowflake::new),
            joined_at: model.joined_at,
            last_sync_at: model.last_sync_at,
            last_api_call_at: model.last_api_call_at,
            sync_in_progress: model.sync_in_progress,
        }
    }
}

/// Convert a sponsor row to its entity, resolving the kind tag
pub fn sponsor_from_model(model: SponsorModel) -> RepoResult<Sponsor> {
    let person = parse_person(&model.person_id)?;
    let kind = match model.kind.as_str() {
        KIND_PLATFORM => SponsorKind::Platform {
            role_ids: model.role_ids.into_iter().map(Snowflake::new).collect(),
            is_booster: model.is_booster,
        },
        KIND_MANUAL => SponsorKind::Manual {
            role_names: model.role_names,
            added_by: model.added_by.map(Snowflake::new),
            notes: model.notes,
        },
        other => {
            return Err(DomainError::DatabaseError(format!(
                "unknown sponsor kind in row: {other:?}"
            )))
        }
    };

    Ok(Sponsor {
        guild_id: Snowflake::new(model.guild_id),
        person,
        kind,
        display_name: model.display_name,
        avatar: model.avatar,
        joined_at: model.joined_at,
        updated_at: model.updated_at,
    })
}

/// Column values for persisting a sponsor's kind-specific fields
pub struct SponsorColumns<'a> {
    pub kind: &'static str,
    pub role_ids: Vec<i64>,
    pub role_names: &'a [String],
    pub is_booster: bool,
    pub added_by: Option<i64>,
    pub notes: Option<&'a str>,
}

/// Flatten a sponsor's kind into the column layout of the sponsors table
pub fn sponsor_columns(sponsor: &Sponsor) -> SponsorColumns<'_> {
    match &sponsor.kind {
        SponsorKind::Platform { role_ids, is_booster } => SponsorColumns {
            kind: KIND_PLATFORM,
            role_ids: role_ids.iter().map(|id| id.into_inner()).collect(),
            role_names: &[],
            is_booster: *is_booster,
            added_by: None,
            notes: None,
        },
        SponsorKind::Manual { role_names, added_by, notes } => SponsorColumns {
            kind: KIND_MANUAL,
            role_ids: Vec::new(),
            role_names,
            is_booster: false,
            added_by: added_by.map(Snowflake::into_inner),
            notes: notes.as_deref(),
        },
    }
}

/// Convert a binding row plus its (possibly empty) history rows
pub fn binding_from_model(model: BindingModel, history: Vec<NameChangeModel>) -> RepoResult<Binding> {
    Ok(Binding {
        guild_id: Snowflake::new(model.guild_id),
        person: parse_person(&model.person_id)?,
        current_name: model.vrchat_name,
        first_bound_at: model.first_bound_at,
        updated_at: model.updated_at,
        history: history.into_iter().map(NameChange::from).collect(),
    })
}

impl From<NameChangeModel> for NameChange {
    fn from(model: NameChangeModel) -> Self {
        Self {
            previous_name: model.previous_name,
            changed_at: model.changed_at,
        }
    }
}

/// Convert an external sponsor row to its entity
pub fn external_from_model(model: ExternalSponsorModel) -> RepoResult<ExternalSponsor> {
    let linked_person = match model.linked_person_id.as_deref() {
        Some(raw) => Some(parse_person(raw)?),
        None => None,
    };

    Ok(ExternalSponsor {
        guild_id: Snowflake::new(model.guild_id),
        vrchat_name: model.vrchat_name,
        linked_person,
        role_names: model.role_names,
        display_name: model.display_name,
        added_by: Snowflake::new(model.added_by),
        added_at: model.added_at,
        updated_at: model.updated_at,
        notes: model.notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sponsor_model(kind: &str) -> SponsorModel {
        SponsorModel {
            guild_id: 1,
            person_id: "42".to_string(),
            kind: kind.to_string(),
            role_ids: vec![10, 11],
            role_names: vec!["Gold".to_string()],
            is_booster: true,
            display_name: None,
            avatar: None,
            notes: None,
            added_by: None,
            joined_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_platform_sponsor_mapping() {
        let sponsor = sponsor_from_model(sponsor_model(KIND_PLATFORM)).unwrap();
        assert!(sponsor.is_platform());
        assert_eq!(sponsor.role_ids(), &[Snowflake::new(10), Snowflake::new(11)]);
        assert!(sponsor.is_booster());
    }

    #[test]
    fn test_manual_sponsor_mapping() {
        let sponsor = sponsor_from_model(sponsor_model(KIND_MANUAL)).unwrap();
        assert!(!sponsor.is_platform());
        // Manual records never report boost state, whatever the column says
        assert!(!sponsor.is_booster());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = sponsor_from_model(sponsor_model("webhook")).unwrap_err();
        assert!(matches!(err, DomainError::DatabaseError(_)));
    }

    #[test]
    fn test_sponsor_columns_round_trip() {
        let sponsor = sponsor_from_model(sponsor_model(KIND_PLATFORM)).unwrap();
        let cols = sponsor_columns(&sponsor);
        assert_eq!(cols.kind, KIND_PLATFORM);
        assert_eq!(cols.role_ids, vec![10, 11]);
        assert!(cols.role_names.is_empty());
    }

    #[test]
    fn test_bad_person_id_is_rejected() {
        let mut model = sponsor_model(KIND_PLATFORM);
        model.person_id = "not an id".to_string();
        assert!(sponsor_from_model(model).is_err());
    }
}
