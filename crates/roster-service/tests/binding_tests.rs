//! Binding lifecycle tests against the in-memory stores

mod common;

use std::time::Duration;

use common::{guild, member, platform, setup_guild, world, world_with_cooldown};
use roster_core::{DomainError, Snowflake};
use roster_service::{BindingService, ServiceError};

const GUILD: i64 = 100;
const ROLE: i64 = 10;
const ALICE: i64 = 1000;

#[tokio::test]
async fn first_bind_creates_binding_with_empty_history() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    w.directory.put_member(guild(GUILD), member(ALICE, "Alice", &[ROLE]));

    let outcome = BindingService::new(&w.ctx)
        .bind(guild(GUILD), platform(ALICE), "Alice")
        .await
        .unwrap();

    assert!(outcome.was_new_binding);
    assert_eq!(outcome.binding.current_name, "Alice");
    assert!(outcome.binding.history.is_empty());
}

#[tokio::test]
async fn rebinding_same_name_only_touches_timestamp() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    w.directory.put_member(guild(GUILD), member(ALICE, "Alice", &[ROLE]));
    let service = BindingService::new(&w.ctx);

    let first = service.bind(guild(GUILD), platform(ALICE), "Alice").await.unwrap();
    let second = service.bind(guild(GUILD), platform(ALICE), "Alice").await.unwrap();

    assert!(!second.was_new_binding);
    assert_eq!(second.binding.current_name, "Alice");
    assert!(second.binding.history.is_empty());
    assert_eq!(second.binding.first_bound_at, first.binding.first_bound_at);
    assert!(second.binding.updated_at >= first.binding.updated_at);
}

#[tokio::test]
async fn rebinding_new_name_appends_exactly_one_history_entry() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    w.directory.put_member(guild(GUILD), member(ALICE, "Alice", &[ROLE]));
    let service = BindingService::new(&w.ctx);

    service.bind(guild(GUILD), platform(ALICE), "Alice").await.unwrap();
    let outcome = service.bind(guild(GUILD), platform(ALICE), "Alice2").await.unwrap();

    assert!(!outcome.was_new_binding);
    assert_eq!(outcome.binding.current_name, "Alice2");
    assert_eq!(outcome.binding.history.len(), 1);
    assert_eq!(outcome.binding.history[0].previous_name, "Alice");
}

#[tokio::test]
async fn name_is_sanitized_before_storage() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;

    let outcome = BindingService::new(&w.ctx)
        .bind(guild(GUILD), platform(ALICE), "  Alice   in  Wonderland ")
        .await
        .unwrap();

    assert_eq!(outcome.binding.current_name, "Alice in Wonderland");
}

#[tokio::test]
async fn invalid_names_are_rejected() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    let service = BindingService::new(&w.ctx);

    let err = service.bind(guild(GUILD), platform(ALICE), "   ").await.unwrap_err();
    assert!(matches!(err, ServiceError::Domain(DomainError::EmptyName)));

    let long = "x".repeat(65);
    let err = service.bind(guild(GUILD), platform(ALICE), &long).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::NameTooLong { len: 65 })
    ));

    // Nothing was stored
    assert_eq!(w.binding_repo.len(), 0);
}

#[tokio::test]
async fn binding_requires_a_managed_role_gate() {
    let w = world();
    // Guild registered, but no managed roles: the feature is disabled
    setup_guild(&w, GUILD, &[]).await;

    let err = BindingService::new(&w.ctx)
        .bind(guild(GUILD), platform(ALICE), "Alice")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(DomainError::BindingDisabled)));
}

#[tokio::test]
async fn unknown_guild_counts_as_disabled() {
    let w = world();

    let err = BindingService::new(&w.ctx)
        .bind(guild(GUILD), platform(ALICE), "Alice")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Domain(DomainError::BindingDisabled)));
}

#[tokio::test]
async fn cooldown_blocks_immediate_rebind_but_not_failures() {
    let w = world_with_cooldown(Duration::from_secs(60));
    setup_guild(&w, GUILD, &[ROLE]).await;
    let service = BindingService::new(&w.ctx);

    // A rejected name does not arm the cooldown
    service.bind(guild(GUILD), platform(ALICE), "  ").await.unwrap_err();
    service.bind(guild(GUILD), platform(ALICE), "Alice").await.unwrap();

    let err = service.bind(guild(GUILD), platform(ALICE), "Alice2").await.unwrap_err();
    assert!(matches!(err, ServiceError::Cooldown { .. }));

    // Another person is unaffected
    service.bind(guild(GUILD), platform(ALICE + 1), "Bob").await.unwrap();
}

#[tokio::test]
async fn bind_lazily_creates_the_sponsor_record() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    w.directory.put_member(guild(GUILD), member(ALICE, "Alice", &[ROLE]));

    assert_eq!(w.sponsor_repo.len(), 0);
    BindingService::new(&w.ctx)
        .bind(guild(GUILD), platform(ALICE), "Alice")
        .await
        .unwrap();

    let sponsor = w
        .ctx
        .sponsor_repo()
        .find(guild(GUILD), &platform(ALICE))
        .await
        .unwrap()
        .expect("sponsor record created on bind");
    assert!(sponsor.is_platform());
    assert_eq!(sponsor.role_ids(), &[Snowflake::new(ROLE)]);
}

#[tokio::test]
async fn bind_notifies_the_configured_target_with_distinct_wording() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;

    // Configure a notification target
    let mut config = w.ctx.guild_repo().find(guild(GUILD)).await.unwrap().unwrap();
    config.notify_user_id = Some(Snowflake::new(777));
    w.ctx.guild_repo().update(&config).await.unwrap();

    let service = BindingService::new(&w.ctx);
    service.bind(guild(GUILD), platform(ALICE), "Alice").await.unwrap();
    service.bind(guild(GUILD), platform(ALICE), "Alice").await.unwrap();
    service.bind(guild(GUILD), platform(ALICE), "Alice2").await.unwrap();

    let dms = w.directory.dms.lock().unwrap();
    // First bind and rename notify; the same-name rebind does not
    assert_eq!(dms.len(), 2);
    assert!(dms[0].1.contains("linked"));
    assert!(dms[1].1.contains("Alice → Alice2") || dms[1].1.contains("changed"));
}

#[tokio::test]
async fn dm_failure_never_fails_the_bind() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;

    let mut config = w.ctx.guild_repo().find(guild(GUILD)).await.unwrap().unwrap();
    config.notify_user_id = Some(Snowflake::new(777));
    w.ctx.guild_repo().update(&config).await.unwrap();
    w.directory.fail_dms.store(true, std::sync::atomic::Ordering::SeqCst);

    let outcome = BindingService::new(&w.ctx)
        .bind(guild(GUILD), platform(ALICE), "Alice")
        .await
        .unwrap();
    assert!(outcome.was_new_binding);
}

#[tokio::test]
async fn unbind_reports_name_and_duration_and_keeps_sponsor() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    w.directory.put_member(guild(GUILD), member(ALICE, "Alice", &[ROLE]));
    let service = BindingService::new(&w.ctx);

    service.bind(guild(GUILD), platform(ALICE), "Alice").await.unwrap();
    let report = service
        .unbind(guild(GUILD), &platform(ALICE))
        .await
        .unwrap()
        .expect("binding existed");

    assert_eq!(report.vrchat_name, "Alice");
    assert_eq!(report.bound_days, 0);

    // Unbind detaches the name only; the sponsor record stays
    assert!(w
        .ctx
        .sponsor_repo()
        .find(guild(GUILD), &platform(ALICE))
        .await
        .unwrap()
        .is_some());

    // Unbinding again finds nothing
    assert!(service.unbind(guild(GUILD), &platform(ALICE)).await.unwrap().is_none());
}

#[tokio::test]
async fn profile_caps_history_for_display() {
    let w = world();
    setup_guild(&w, GUILD, &[ROLE]).await;
    let service = BindingService::new(&w.ctx);

    for i in 0..15 {
        service
            .bind(guild(GUILD), platform(ALICE), &format!("Name{i}"))
            .await
            .unwrap();
    }

    let binding = service
        .profile(guild(GUILD), &platform(ALICE))
        .await
        .unwrap()
        .expect("binding exists");

    assert_eq!(binding.current_name, "Name14");
    assert_eq!(binding.history.len(), 10);
    // Most recent change first
    assert_eq!(binding.history[0].previous_name, "Name13");
}
