// 配置模块

pub mod db_conf;
pub mod app_config;

pub use db_conf::{DbConfig, init_db, get_db, test_connection, get_pool_status};
pub use app_config::{AppConfig, ServerConfig, DatabaseConfig, LogConfig, ResolverConfig};
