//! Application services

mod aggregation;
mod binding;
mod context;
mod error;
mod external;
mod guild_config;
mod progress;
mod sponsor;
mod sync;

pub use aggregation::AggregationService;
pub use binding::{BindingService, HISTORY_DISPLAY_CAP};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use external::ExternalSponsorService;
pub use guild_config::GuildConfigService;
pub use progress::ProgressService;
pub use sponsor::{RemovalReport, SponsorService};
pub use sync::SyncService;
