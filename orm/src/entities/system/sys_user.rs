use rbatis::{crud, impl_select};
use rbatis::rbdc::datetime::DateTime;
use serde::{Deserialize, Serialize};

/// 员工账号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SysUser {
    pub id: Option<i64>,
    pub user_account: Option<String>,
    pub user_name: Option<String>,
    /// 所属账户组, 一个员工至多属于一个组
    pub group_id: Option<i64>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(SysUser {}, "sys_user");
impl_select!(SysUser{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});
impl_select!(SysUser{select_by_account(user_account: &str) -> Option => "`where user_account = #{user_account} limit 1`"});

impl SysUser {
    pub const TABLE_NAME: &'static str = "sys_user";
}
