//! Admin operation tests: manual sponsors, external sponsors, guild config,
//! cascades, and uniqueness

mod common;

use common::{guild, member, platform, setup_guild, world};
use roster_core::{DomainError, PersonId, Snowflake};
use roster_service::{
    BindingService, ExternalSponsorService, GuildConfigService, ServiceError, SponsorService,
    SyncService,
};

const GUILD: i64 = 100;
const ROLE: i64 = 10;
const ADMIN: i64 = 99;

#[tokio::test]
async fn manual_sponsor_gets_a_synthetic_id_disjoint_from_platform_ids() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;

    let sponsor = SponsorService::new(&w.ctx)
        .add_manual(
            guild(GUILD),
            None,
            vec!["Patron".to_string()],
            None,
            None,
            Snowflake::new(ADMIN),
        )
        .await
        .unwrap();

    assert!(!sponsor.person.is_platform());
    assert!(sponsor.person.to_string().starts_with("m_"));
}

#[tokio::test]
async fn duplicate_sponsor_is_a_conflict_and_leaves_the_original_alone() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    let service = SponsorService::new(&w.ctx);
    let person = PersonId::Platform(Snowflake::new(1));

    let original = service
        .add_manual(
            guild(GUILD),
            Some(person.clone()),
            vec!["Patron".to_string()],
            Some("First".to_string()),
            None,
            Snowflake::new(ADMIN),
        )
        .await
        .unwrap();

    let err = service
        .add_manual(
            guild(GUILD),
            Some(person.clone()),
            vec!["Other".to_string()],
            Some("Second".to_string()),
            None,
            Snowflake::new(ADMIN),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::DuplicateSponsor(_))
    ));

    // The stored record is the first one, unmodified
    let stored = service.get(guild(GUILD), &person).await.unwrap().unwrap();
    assert_eq!(stored.display_name, original.display_name);
}

#[tokio::test]
async fn manual_sponsor_requires_at_least_one_role() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;

    let err = SponsorService::new(&w.ctx)
        .add_manual(guild(GUILD), None, vec!["  ".to_string()], None, None, Snowflake::new(ADMIN))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::EmptyRoleList)
    ));
}

#[tokio::test]
async fn remove_person_cascades_sponsor_and_binding_together() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    w.directory.put_member(guild(GUILD), member(1, "Alice", &[ROLE]));
    BindingService::new(&w.ctx)
        .bind(guild(GUILD), platform(1), "Alice")
        .await
        .unwrap();

    let report = SponsorService::new(&w.ctx)
        .remove_person(guild(GUILD), &platform(1))
        .await
        .unwrap();

    assert!(report.sponsor_removed);
    assert!(report.binding_removed);
    assert!(w.ctx.sponsor_repo().find(guild(GUILD), &platform(1)).await.unwrap().is_none());
    assert!(w.ctx.binding_repo().find(guild(GUILD), &platform(1)).await.unwrap().is_none());

    // Removing again reports nothing left to do
    let report = SponsorService::new(&w.ctx)
        .remove_person(guild(GUILD), &platform(1))
        .await
        .unwrap();
    assert!(!report.any());
}

#[tokio::test]
async fn search_matches_bound_names_case_insensitively() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    w.directory.put_member(guild(GUILD), member(1, "Alice", &[ROLE]));
    w.directory.put_member(guild(GUILD), member(2, "Bob", &[ROLE]));
    let binding = BindingService::new(&w.ctx);
    binding.bind(guild(GUILD), platform(1), "Alice Wonder").await.unwrap();
    binding.bind(guild(GUILD), platform(2), "Bob").await.unwrap();

    let hits = SponsorService::new(&w.ctx)
        .search(guild(GUILD), "alice")
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].binding.current_name, "Alice Wonder");
    assert!(hits[0].sponsor.is_some());
}

#[tokio::test]
async fn external_sponsor_name_is_unique_per_guild() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    let service = ExternalSponsorService::new(&w.ctx);

    service
        .add(guild(GUILD), "Ghost", vec!["Gold".to_string()], None, None, None, Snowflake::new(ADMIN))
        .await
        .unwrap();

    let err = service
        .add(guild(GUILD), "Ghost", vec!["VIP".to_string()], None, None, None, Snowflake::new(ADMIN))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::DuplicateExternalSponsor(_))
    ));
}

#[tokio::test]
async fn external_sponsor_link_is_unique_per_guild() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    let service = ExternalSponsorService::new(&w.ctx);
    let linked = PersonId::Platform(Snowflake::new(42));

    service
        .add(
            guild(GUILD),
            "Ghost",
            vec!["Gold".to_string()],
            None,
            None,
            Some(linked.clone()),
            Snowflake::new(ADMIN),
        )
        .await
        .unwrap();

    let err = service
        .add(
            guild(GUILD),
            "Shade",
            vec!["Gold".to_string()],
            None,
            None,
            Some(linked),
            Snowflake::new(ADMIN),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::ExternalLinkTaken(_))
    ));
}

#[tokio::test]
async fn external_sponsor_roles_can_be_replaced() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    let service = ExternalSponsorService::new(&w.ctx);

    service
        .add(guild(GUILD), "Ghost", vec!["Gold".to_string()], None, None, None, Snowflake::new(ADMIN))
        .await
        .unwrap();
    let updated = service
        .set_roles(guild(GUILD), "Ghost", vec!["VIP".to_string(), "Gold".to_string()])
        .await
        .unwrap();

    assert_eq!(updated.role_names, vec!["VIP".to_string(), "Gold".to_string()]);

    assert!(service.remove(guild(GUILD), "Ghost").await.unwrap());
    assert!(!service.remove(guild(GUILD), "Ghost").await.unwrap());
}

#[tokio::test]
async fn notify_target_rolls_back_when_the_test_dm_fails() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    let service = GuildConfigService::new(&w.ctx);

    w.directory.fail_dms.store(true, std::sync::atomic::Ordering::SeqCst);
    let err = service
        .set_notify_target(guild(GUILD), Snowflake::new(777))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    // The change was not persisted
    let config = w.ctx.guild_repo().find(guild(GUILD)).await.unwrap().unwrap();
    assert!(config.notify_user_id.is_none());

    // With delivery working it sticks
    w.directory.fail_dms.store(false, std::sync::atomic::Ordering::SeqCst);
    let config = service.set_notify_target(guild(GUILD), Snowflake::new(777)).await.unwrap();
    assert_eq!(config.notify_user_id, Some(Snowflake::new(777)));
    assert_eq!(w.directory.dm_count(), 1);
}

#[tokio::test]
async fn managed_role_configuration_round_trip() {
    let w = world();
    setup_guild(&w, GUILD, &[]).await;
    let service = GuildConfigService::new(&w.ctx);

    let config = service.add_managed_role(guild(GUILD), Snowflake::new(ROLE)).await.unwrap();
    assert!(config.binding_enabled());

    let err = service.add_managed_role(guild(GUILD), Snowflake::new(ROLE)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let config = service.remove_managed_role(guild(GUILD), Snowflake::new(ROLE)).await.unwrap();
    assert!(!config.binding_enabled());

    let err = service.remove_managed_role(guild(GUILD), Snowflake::new(ROLE)).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
async fn deleting_a_guild_leaves_no_orphan_records() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    w.directory.put_member(guild(GUILD), member(1, "Alice", &[ROLE]));

    SyncService::new(&w.ctx).sync_managed_members(guild(GUILD)).await.unwrap();
    BindingService::new(&w.ctx).bind(guild(GUILD), platform(1), "Alice").await.unwrap();
    ExternalSponsorService::new(&w.ctx)
        .add(guild(GUILD), "Ghost", vec!["Gold".to_string()], None, None, None, Snowflake::new(ADMIN))
        .await
        .unwrap();

    // A second guild's data must survive the cascade
    setup_guild(&w, GUILD + 1, &[ROLE]).await;
    w.directory.put_member(guild(GUILD + 1), member(2, "Bob", &[ROLE]));
    BindingService::new(&w.ctx).bind(guild(GUILD + 1), platform(2), "Bob").await.unwrap();

    GuildConfigService::new(&w.ctx).delete_guild(guild(GUILD)).await.unwrap();

    assert!(w.ctx.guild_repo().find(guild(GUILD)).await.unwrap().is_none());
    assert!(w.ctx.sponsor_repo().find_by_guild(guild(GUILD)).await.unwrap().is_empty());
    assert!(w.ctx.binding_repo().find_by_guild(guild(GUILD)).await.unwrap().is_empty());
    assert!(w.ctx.external_repo().find_by_guild(guild(GUILD)).await.unwrap().is_empty());

    assert_eq!(w.ctx.binding_repo().find_by_guild(guild(GUILD + 1)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn ensure_is_idempotent() {
    let w = world();
    let service = GuildConfigService::new(&w.ctx);

    let first = service.ensure(guild(GUILD), Snowflake::new(1)).await.unwrap();
    let second = service.ensure(guild(GUILD), Snowflake::new(2)).await.unwrap();

    // The existing config wins; ensure never overwrites
    assert_eq!(second.owner_id, first.owner_id);
}
