use rbatis::{crud, impl_select};
use rbatis::rbdc::datetime::DateTime;
use serde::{Deserialize, Serialize};

/// 推广人
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppPromoter {
    pub id: Option<i64>,
    pub name: String,
    /// 所属渠道(已关联)
    pub channel_id: Option<i64>,
    /// 所属渠道名(批量导入时的自由文本, 未关联时使用)
    pub channel_name: Option<String>,
    pub creator_id: Option<i64>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(AppPromoter {}, "app_promoter");
impl_select!(AppPromoter{select_by_name(name: &str) -> Option => "`where name = #{name} limit 1`"});

impl AppPromoter {
    pub const TABLE_NAME: &'static str = "app_promoter";
}
