//! # roster-service
//!
//! Application layer containing business logic, services, and DTOs: binding
//! management, bulk role sync, binding progress, and the role-grouped roster
//! aggregation consumed by the read API.

pub mod cache;
pub mod dto;
pub mod services;

// Re-export commonly used types at crate root
pub use cache::{CooldownGate, RosterCache};
pub use dto::{
    BindOutcome, BindingProgress, RosterResponse, SearchHit, SponsorEntry, SyncReport,
    UnbindReport,
};
pub use services::{
    AggregationService, BindingService, ExternalSponsorService, GuildConfigService,
    ProgressService, RemovalReport, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, SponsorService, SyncService, HISTORY_DISPLAY_CAP,
};
