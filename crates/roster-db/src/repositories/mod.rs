//! PostgreSQL repository implementations

mod binding;
mod error;
mod external;
mod guild_config;
mod sponsor;

pub use binding::PgBindingRepository;
pub use external::PgExternalSponsorRepository;
pub use guild_config::PgGuildConfigRepository;
pub use sponsor::PgSponsorRepository;
