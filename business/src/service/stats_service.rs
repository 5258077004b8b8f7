use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use common::constants::order_status;
use common::AppResult;
use orm::entities::{AppRentOrder, AppRentOrderExtend};
use rbatis::RBatis;
use serde::Serialize;

/// 订单统计行, 查询边界上的强类型结构
///
/// 分组维度: (录单人, 来源, 推广人, 渠道, 联系名)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatRow {
    pub creator_id: i64,
    pub source: String,
    pub promoter_id: Option<i64>,
    pub channel_id: Option<i64>,
    pub contact_label: String,
    /// 非关闭订单数
    pub order_count: i64,
    /// 非关闭订单营收合计
    pub total_revenue: f64,
    /// 已关闭订单的退款金额合计
    pub refunded_amount: f64,
    /// 高价差基数: 非关闭订单 max(0, 租金 - 标准租金) 合计
    pub high_ticket_base: f64,
}

/// 订单营收 = 租金 + 保险 + 逾期费 + 续租金额合计 (押金不计入)
pub fn calculate_order_revenue(order: &AppRentOrder, extend_prices: &[f64]) -> f64 {
    order.rent_price + order.insurance_price + order.overdue_fee + extend_prices.iter().sum::<f64>()
}

/// 把订单快照聚合为统计行, 无副作用
///
/// 已关闭订单只计入 refunded_amount, 不计入订单数/营收/高价差基数
pub fn aggregate_orders(
    orders: &[AppRentOrder],
    extends_by_order: &HashMap<i64, Vec<f64>>,
) -> Vec<OrderStatRow> {
    // BTreeMap 保证输出顺序稳定
    let mut groups: BTreeMap<(i64, String, Option<i64>, Option<i64>, String), OrderStatRow> =
        BTreeMap::new();

    for order in orders {
        let source = order.source.clone().unwrap_or_default();
        let contact_label = order.contact_name.clone().unwrap_or_default();
        let key = (
            order.creator_id,
            source.clone(),
            order.promoter_id,
            order.channel_id,
            contact_label.clone(),
        );

        let row = groups.entry(key).or_insert_with(|| OrderStatRow {
            creator_id: order.creator_id,
            source,
            promoter_id: order.promoter_id,
            channel_id: order.channel_id,
            contact_label,
            order_count: 0,
            total_revenue: 0.0,
            refunded_amount: 0.0,
            high_ticket_base: 0.0,
        });

        let no_extends = Vec::new();
        let extend_prices = order
            .id
            .and_then(|id| extends_by_order.get(&id))
            .unwrap_or(&no_extends);
        let revenue = calculate_order_revenue(order, extend_prices);

        if order_status::is_closed(order.status) {
            row.refunded_amount += revenue;
        } else {
            row.order_count += 1;
            row.total_revenue += revenue;
            row.high_ticket_base += (order.rent_price - order.standard_price).max(0.0);
        }
    }

    groups.into_values().collect()
}

/// 订单统计服务
pub struct StatsService {
    rb: Arc<RBatis>,
}

impl StatsService {
    pub fn new(rb: Arc<RBatis>) -> Self {
        Self { rb }
    }

    /// 查询统计行, creator_id 为空时为管理员全量口径
    pub async fn stat_rows(&self, creator_id: Option<i64>) -> AppResult<Vec<OrderStatRow>> {
        let rb = self.rb.as_ref();
        let orders = match creator_id {
            Some(id) => AppRentOrder::select_by_creator(rb, id).await?,
            None => AppRentOrder::select_all(rb).await?,
        };

        let order_ids: Vec<i64> = orders.iter().filter_map(|o| o.id).collect();
        let mut extends_by_order: HashMap<i64, Vec<f64>> = HashMap::new();
        if !order_ids.is_empty() {
            let extends =
                AppRentOrderExtend::select_in_column(rb, "order_id", &order_ids).await?;
            for e in extends {
                extends_by_order.entry(e.order_id).or_default().push(e.price);
            }
        }

        Ok(aggregate_orders(&orders, &extends_by_order))
    }
}
