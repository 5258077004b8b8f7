use rbatis::crud;
use rbatis::rbdc::datetime::DateTime;
use serde::{Deserialize, Serialize};

/// 订单续租记录, 每次续租一条, 金额计入订单营收
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppRentOrderExtend {
    pub id: Option<i64>,
    pub order_id: i64,
    pub price: f64,
    pub create_time: Option<DateTime>,
}

crud!(AppRentOrderExtend {}, "app_rent_order_extend");

impl AppRentOrderExtend {
    pub const TABLE_NAME: &'static str = "app_rent_order_extend";
}
