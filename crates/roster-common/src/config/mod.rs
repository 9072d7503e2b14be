mod app_config;

pub use app_config::{
    ApiConfig, AppConfig, AppSettings, CacheConfig, ConfigError, CorsConfig, DatabaseConfig,
    DiscordConfig, Environment, RateLimitConfig,
};
