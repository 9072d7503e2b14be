//! # roster-core
//!
//! Domain layer containing entities, value objects, repository traits, and the
//! member-directory port. This crate has zero dependencies on infrastructure
//! (database, web framework, Discord client, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Binding, ExternalSponsor, GuildConfig, NameChange, Sponsor, SponsorKind};
pub use error::DomainError;
pub use traits::{
    BindingRepository, DirectoryMember, ExternalSponsorRepository, GuildConfigRepository,
    MemberDirectory, RepoResult, SnapshotUpsert, SponsorRepository, SyncCounts,
};
pub use value_objects::{sanitize_name, PersonId, RoleSnapshot, Snowflake, VrchatName};
