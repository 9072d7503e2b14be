//! Ports - interfaces the domain needs the infrastructure to provide

mod directory;
mod repositories;

pub use directory::{DirectoryMember, MemberDirectory};
pub use repositories::{
    BindingRepository, ExternalSponsorRepository, GuildConfigRepository, RepoResult,
    SnapshotUpsert, SponsorRepository, SyncCounts,
};
