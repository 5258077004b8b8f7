use rbatis::{crud, impl_select};
use rbatis::rbdc::datetime::DateTime;
use serde::{Deserialize, Serialize};

/// 账户组: 持有一组佣金规则和一个高价差比例
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppAccountGroup {
    pub id: Option<i64>,
    pub name: String,
    /// 高价差佣金比例 [0,100]
    pub high_ticket_rate: f64,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(AppAccountGroup {}, "app_account_group");
impl_select!(AppAccountGroup{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});

impl AppAccountGroup {
    pub const TABLE_NAME: &'static str = "app_account_group";
}
