use rbatis::{crud, impl_select, RBatis};
use rbatis::rbdc::datetime::DateTime;
use serde::{Deserialize, Serialize};

/// 租赁订单
///
/// 订单创建后金额字段不再变动, 状态随订单生命周期流转;
/// promoter_id / channel_id / product_id 由识别服务补齐, 一经写入不再覆盖
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppRentOrder {
    pub id: Option<i64>,
    pub order_number: Option<String>,
    /// 订单状态, 见 common::constants::order_status
    pub status: i32,
    /// 录单人(员工)ID
    pub creator_id: i64,
    pub rent_price: f64,
    pub insurance_price: f64,
    pub overdue_fee: f64,
    pub deposit: f64,
    /// 机型标准租金, 高价差佣金的参考价
    pub standard_price: f64,
    pub promoter_id: Option<i64>,
    pub channel_id: Option<i64>,
    pub product_id: Option<i64>,
    /// 来源编码(如 rrz / zfb / offline), 渠道未关联时用于识别
    pub source: Option<String>,
    /// 推广人联系名(自由文本), 推广人未关联时用于识别
    pub contact_name: Option<String>,
    /// 商品名称(自由文本), 商品未关联时用于识别
    pub product_name: Option<String>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(AppRentOrder {}, "app_rent_order");
impl_select!(AppRentOrder{select_by_creator(creator_id: i64) => "`where creator_id = #{creator_id}`"});
impl_select!(AppRentOrder{select_missing_links() => "`where promoter_id is null or product_id is null or channel_id is null`"});
impl_select!(AppRentOrder{select_missing_links_by_creator(creator_id: i64) => "`where creator_id = #{creator_id} and (promoter_id is null or product_id is null or channel_id is null)`"});
impl_select!(AppRentOrder{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"});

impl AppRentOrder {
    pub const TABLE_NAME: &'static str = "app_rent_order";

    /// 仅在 promoter_id 为空时写入, 保证回填幂等
    pub async fn set_promoter_if_null(
        rb: &RBatis,
        id: i64,
        promoter_id: i64,
    ) -> Result<u64, rbatis::Error> {
        let res = rb
            .exec(
                "update app_rent_order set promoter_id = ?, update_time = now() \
                 where id = ? and promoter_id is null",
                vec![rbs::to_value!(promoter_id), rbs::to_value!(id)],
            )
            .await?;
        Ok(res.rows_affected)
    }

    /// 仅在 channel_id 为空时写入
    pub async fn set_channel_if_null(
        rb: &RBatis,
        id: i64,
        channel_id: i64,
    ) -> Result<u64, rbatis::Error> {
        let res = rb
            .exec(
                "update app_rent_order set channel_id = ?, update_time = now() \
                 where id = ? and channel_id is null",
                vec![rbs::to_value!(channel_id), rbs::to_value!(id)],
            )
            .await?;
        Ok(res.rows_affected)
    }

    /// 仅在 product_id 为空时写入
    pub async fn set_product_if_null(
        rb: &RBatis,
        id: i64,
        product_id: i64,
    ) -> Result<u64, rbatis::Error> {
        let res = rb
            .exec(
                "update app_rent_order set product_id = ?, update_time = now() \
                 where id = ? and product_id is null",
                vec![rbs::to_value!(product_id), rbs::to_value!(id)],
            )
            .await?;
        Ok(res.rows_affected)
    }
}
