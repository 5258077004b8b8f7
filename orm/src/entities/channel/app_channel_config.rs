use rbatis::{crud, impl_select};
use rbatis::rbdc::datetime::DateTime;
use serde::{Deserialize, Serialize};

/// 渠道配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppChannelConfig {
    pub id: Option<i64>,
    pub name: String,
    /// 结算策略: 是否自动结算
    pub auto_settlement: Option<bool>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(AppChannelConfig {}, "app_channel_config");
impl_select!(AppChannelConfig{select_by_name(name: &str) -> Option => "`where name = #{name} limit 1`"});

impl AppChannelConfig {
    pub const TABLE_NAME: &'static str = "app_channel_config";
}
