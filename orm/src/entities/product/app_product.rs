use rbatis::{crud, impl_select};
use rbatis::rbdc::datetime::DateTime;
use serde::{Deserialize, Serialize};

/// 商品(机型)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppProduct {
    pub id: Option<i64>,
    pub name: String,
    /// 匹配关键字, 逗号分隔, 用于线上订单自动归类
    pub match_keywords: Option<String>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(AppProduct {}, "app_product");
impl_select!(AppProduct{select_by_name(name: &str) -> Option => "`where name = #{name} limit 1`"});

impl AppProduct {
    pub const TABLE_NAME: &'static str = "app_product";

    /// 拆分关键字列表
    pub fn keywords(&self) -> Vec<&str> {
        self.match_keywords
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(|k| k.trim())
                    .filter(|k| !k.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
