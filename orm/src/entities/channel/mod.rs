pub mod app_channel_config;

pub use app_channel_config::AppChannelConfig;
