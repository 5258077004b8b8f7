use std::sync::Arc;

use common::constants::backfill::{MISS_LOG_LIMIT, PROGRESS_LOG_INTERVAL};
use common::{AppError, AppResult};
use orm::entities::AppRentOrder;
use rbatis::RBatis;
use serde::Serialize;

use super::identity_service::{IdentityService, Registries, ResolvedLinks};

/// 历史订单外键回填结果
#[derive(Debug, Default, Serialize)]
pub struct BackfillResult {
    /// 本次扫描的缺失外键订单数
    pub scanned: usize,
    /// 实际产生写入的订单数
    pub updated_count: usize,
    /// 未匹配记录, 留待人工处理
    pub unmatched: Vec<String>,
}

/// 回填服务: 扫描缺失外键的历史订单, 逐单识别并补齐
///
/// 外键只在为空时写入, 对不变的数据集重复执行零写入;
/// 单个订单持久化失败只记日志跳过, 不中断整批;
/// 不支持同一数据集上并发执行(由外部调度保证单实例运行)
pub struct BackfillService {
    rb: Arc<RBatis>,
    identity: Arc<IdentityService>,
}

impl BackfillService {
    pub fn new(rb: Arc<RBatis>, identity: Arc<IdentityService>) -> Self {
        Self { rb, identity }
    }

    /// 对单个订单执行识别并落库, 返回本次新解析出的外键
    pub async fn resolve_order(&self, order_id: i64) -> AppResult<ResolvedLinks> {
        let rb = self.rb.as_ref();
        let order = AppRentOrder::select_by_id(rb, order_id)
            .await?
            .ok_or_else(|| AppError::not_found("error.order_not_found"))?;

        let registries = self.identity.load_registries().await?;
        let links = self.identity.plan_links(&order, &registries);
        if !links.is_empty() {
            self.apply_links(order_id, &links).await?;
        }
        Ok(links)
    }

    /// 回填, creator_id 为空时处理全量历史订单
    pub async fn run(&self, creator_id: Option<i64>) -> AppResult<BackfillResult> {
        let rb = self.rb.as_ref();
        let registries = self.identity.load_registries().await?;
        let orders = match creator_id {
            Some(id) => AppRentOrder::select_missing_links_by_creator(rb, id).await?,
            None => AppRentOrder::select_missing_links(rb).await?,
        };

        log::info!("开始回填, 待处理订单 {} 条", orders.len());

        let mut result = BackfillResult {
            scanned: orders.len(),
            ..Default::default()
        };
        for order in &orders {
            let Some(order_id) = order.id else { continue };

            let links = self.identity.plan_links(order, &registries);
            collect_misses(order, &links, &mut result.unmatched);
            if links.is_empty() {
                continue;
            }

            // 单个订单失败不中断整批
            match self.apply_links(order_id, &links).await {
                Ok(rows) if rows > 0 => {
                    result.updated_count += 1;
                    if result.updated_count % PROGRESS_LOG_INTERVAL == 0 {
                        log::info!("回填进度: 已更新 {} 条订单", result.updated_count);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("订单 {} 回填写入失败, 跳过: {}", order_id, e);
                }
            }
        }

        log::info!(
            "回填完成: 扫描 {} 条, 更新 {} 条, 未匹配 {} 条",
            result.scanned,
            result.updated_count,
            result.unmatched.len()
        );
        Ok(result)
    }

    /// 落库, 仅在外键为空时写入, 返回受影响行数合计
    async fn apply_links(&self, order_id: i64, links: &ResolvedLinks) -> AppResult<u64> {
        let rb = self.rb.as_ref();
        let mut rows = 0;
        if let Some(pid) = links.promoter_id {
            rows += AppRentOrder::set_promoter_if_null(rb, order_id, pid).await?;
        }
        if let Some(pid) = links.product_id {
            rows += AppRentOrder::set_product_if_null(rb, order_id, pid).await?;
        }
        if let Some(cid) = links.channel_id {
            rows += AppRentOrder::set_channel_if_null(rb, order_id, cid).await?;
        }
        Ok(rows)
    }
}

/// 记录本次尝试过但未解析出的维度
///
/// 返回值全部进入结果, 日志只打前 MISS_LOG_LIMIT 条避免刷屏
fn collect_misses(order: &AppRentOrder, links: &ResolvedLinks, unmatched: &mut Vec<String>) {
    let order_no = order.order_number.as_deref().unwrap_or("?");

    let mut push = |entry: String| {
        if unmatched.len() < MISS_LOG_LIMIT {
            log::warn!("回填未匹配: {}", entry);
        }
        unmatched.push(entry);
    };

    if order.promoter_id.is_none() && links.promoter_id.is_none() {
        if let Some(label) = order.contact_name.as_deref().filter(|s| !s.trim().is_empty()) {
            push(format!("订单 {}: 推广人 '{}' 未匹配", order_no, label));
        }
    }
    if order.product_id.is_none() && links.product_id.is_none() {
        if let Some(label) = order.product_name.as_deref().filter(|s| !s.trim().is_empty()) {
            push(format!("订单 {}: 商品 '{}' 未匹配", order_no, label));
        }
    }
    if order.channel_id.is_none() && links.channel_id.is_none() {
        if let Some(code) = order.source.as_deref().filter(|s| !s.trim().is_empty()) {
            push(format!("订单 {}: 来源编码 '{}' 未匹配渠道", order_no, code));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: i64) -> AppRentOrder {
        AppRentOrder {
            id: Some(id),
            order_number: Some(format!("R{}", id)),
            status: 0,
            creator_id: 1,
            rent_price: 100.0,
            insurance_price: 0.0,
            overdue_fee: 0.0,
            deposit: 0.0,
            standard_price: 100.0,
            promoter_id: None,
            channel_id: None,
            product_id: None,
            source: Some("unknown_code".to_string()),
            contact_name: Some("不存在的人".to_string()),
            product_name: Some("不存在的机型".to_string()),
            create_time: None,
            update_time: None,
        }
    }

    #[test]
    fn test_collect_misses_per_dimension() {
        let mut unmatched = Vec::new();
        collect_misses(&order(1), &ResolvedLinks::default(), &mut unmatched);
        assert_eq!(unmatched.len(), 3);
        assert!(unmatched[0].contains("推广人"));
        assert!(unmatched[1].contains("商品"));
        assert!(unmatched[2].contains("来源编码"));
    }

    #[test]
    fn test_collect_misses_skips_resolved_and_blank() {
        let mut o = order(1);
        o.contact_name = Some("  ".to_string());
        let links = ResolvedLinks {
            product_id: Some(5),
            ..Default::default()
        };
        let mut unmatched = Vec::new();
        collect_misses(&o, &links, &mut unmatched);
        // 联系名为空白不记, 商品已解析不记, 只剩渠道
        assert_eq!(unmatched.len(), 1);
        assert!(unmatched[0].contains("来源编码"));
    }

    #[test]
    fn test_collect_misses_unbounded_result_bounded_log() {
        // 结果列表不封顶, 仅日志有上限(上限逻辑在 push 闭包里, 这里验证结果完整)
        let mut unmatched = Vec::new();
        for i in 0..30 {
            collect_misses(&order(i), &ResolvedLinks::default(), &mut unmatched);
        }
        assert_eq!(unmatched.len(), 90);
    }
}
