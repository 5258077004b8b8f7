use rbatis::{crud, impl_select};
use rbatis::rbdc::datetime::DateTime;
use serde::{Deserialize, Serialize};

/// 阶梯佣金规则
///
/// 同一 scope + channel 下的规则区间约定互不重叠,
/// 查询时按 min_count 升序返回, 解析时首条命中生效
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppCommissionRule {
    pub id: Option<i64>,
    /// 所属账户组
    pub group_id: i64,
    /// 作用对象: 0-员工(USER) 1-推广人(PROMOTER)
    pub scope: i32,
    /// 作用渠道, 空为全局默认规则
    pub channel_id: Option<i64>,
    pub min_count: i32,
    /// 区间上限, 空为不封顶
    pub max_count: Option<i32>,
    /// 佣金比例 [0,100]
    pub percentage: f64,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(AppCommissionRule {}, "app_commission_rule");
impl_select!(AppCommissionRule{select_by_group(group_id: i64) => "`where group_id = #{group_id} order by min_count asc`"});

impl AppCommissionRule {
    pub const TABLE_NAME: &'static str = "app_commission_rule";

    pub const SCOPE_USER: i32 = 0;
    pub const SCOPE_PROMOTER: i32 = 1;
}
