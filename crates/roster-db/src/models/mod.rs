//! Database models - rows as SQLx sees them

mod binding;
mod external;
mod guild_config;
mod sponsor;

pub use binding::{BindingModel, NameChangeModel};
pub use external::ExternalSponsorModel;
pub use guild_config::GuildConfigModel;
pub use sponsor::SponsorModel;
