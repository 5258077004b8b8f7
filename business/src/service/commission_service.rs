use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use common::constants::{DEFAULT_CHANNEL_BUCKET, PEER_CHANNEL_KEYWORD};
use common::{AppError, AppResult};
use orm::entities::{
    AppAccountGroup, AppChannelConfig, AppCommissionRule, AppPromoter, SysUser,
};
use rbatis::RBatis;
use serde::Serialize;

use super::identity_service::{resolve, resolve_channel_by_source};
use super::stats_service::{OrderStatRow, StatsService};

/// 阶梯规则解析: 调用方需按 min_count 升序传入
///
/// 返回首条满足 count >= min_count 且 (max_count 为空或 count <= max_count)
/// 的规则比例; 列表为空或无命中返回 0
///
/// 不做区间重叠校验, 区间重叠时首条命中生效(兼容历史数据)
pub fn resolve_percentage(count: i64, rules: &[&AppCommissionRule]) -> f64 {
    for rule in rules {
        let min_ok = count >= rule.min_count as i64;
        let max_ok = rule.max_count.map_or(true, |m| count <= m as i64);
        if min_ok && max_ok {
            return rule.percentage;
        }
    }
    0.0
}

/// 规则录入校验: 比例在 [0,100], 同一 scope+channel 下区间互不重叠
///
/// 只在规则写入路径使用, 解析路径保持首条命中语义
pub fn validate_rules(rules: &[AppCommissionRule]) -> AppResult<()> {
    for rule in rules {
        if !(0.0..=100.0).contains(&rule.percentage) {
            return Err(AppError::validation("error.rule_percentage_out_of_range"));
        }
        if let Some(max) = rule.max_count {
            if max < rule.min_count {
                return Err(AppError::validation("error.rule_range_inverted"));
            }
        }
    }

    let mut by_key: HashMap<(i32, Option<i64>), Vec<&AppCommissionRule>> = HashMap::new();
    for rule in rules {
        by_key.entry((rule.scope, rule.channel_id)).or_default().push(rule);
    }
    for (_, mut group) in by_key {
        group.sort_by_key(|r| r.min_count);
        for pair in group.windows(2) {
            let overlap = match pair[0].max_count {
                // 前一条不封顶, 后面不允许再有规则
                None => true,
                Some(max) => pair[1].min_count <= max,
            };
            if overlap {
                return Err(AppError::validation("error.rule_range_overlap"));
            }
        }
    }
    Ok(())
}

/// 账户组规则按作用对象和渠道拆分
#[derive(Debug, Default)]
pub struct RulePartition<'a> {
    /// 员工默认规则(无渠道)
    pub default_user: Vec<&'a AppCommissionRule>,
    /// 员工渠道规则, 按渠道分组
    pub channel_user: HashMap<i64, Vec<&'a AppCommissionRule>>,
    /// 推广人渠道规则, 按渠道分组
    pub channel_promoter: HashMap<i64, Vec<&'a AppCommissionRule>>,
}

pub fn partition_rules(rules: &[AppCommissionRule]) -> RulePartition<'_> {
    let mut part = RulePartition::default();
    for rule in rules {
        match (rule.scope, rule.channel_id) {
            (AppCommissionRule::SCOPE_USER, None) => part.default_user.push(rule),
            (AppCommissionRule::SCOPE_USER, Some(cid)) => {
                part.channel_user.entry(cid).or_default().push(rule)
            }
            (AppCommissionRule::SCOPE_PROMOTER, Some(cid)) => {
                part.channel_promoter.entry(cid).or_default().push(rule)
            }
            // 推广人全局规则不参与员工佣金计算
            _ => {}
        }
    }
    part
}

/// 佣金计算所需的快照
pub struct CommissionContext<'a> {
    /// 账户组规则, 已按 min_count 升序
    pub rules: &'a [AppCommissionRule],
    /// 高价差比例 [0,100]
    pub high_ticket_rate: f64,
    pub promoters: &'a [AppPromoter],
    pub channels: &'a [AppChannelConfig],
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChannelCommission {
    /// 渠道名, 未归属渠道的统计行记在 "default" 桶
    pub channel: String,
    pub order_count: i64,
    pub total_revenue: f64,
    /// 量阶梯佣金(非推广人归属部分)
    pub volume_gradient: f64,
    /// 下级佣金(推广人归属部分)
    pub subordinate: f64,
    /// 高价差佣金, 仅 default 桶产生
    pub high_ticket: f64,
    /// 渠道侧推广人费率, 按该渠道自身单量取档, 供结算展示
    pub promoter_percentage: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CommissionReport {
    pub volume_gradient: f64,
    /// 下级佣金 - 同行渠道
    pub subordinate_peer: f64,
    /// 下级佣金 - 代理渠道
    pub subordinate_agent: f64,
    pub high_ticket: f64,
    pub employee_total: f64,
    pub channels: Vec<ChannelCommission>,
}

/// 统计行归属渠道: 显式渠道 -> 推广人所属渠道 -> 来源编码候选 -> default 桶
fn bucket_for_row(
    row: &OrderStatRow,
    promoters: &[AppPromoter],
    channels: &[AppChannelConfig],
) -> Option<i64> {
    if row.channel_id.is_some() {
        return row.channel_id;
    }

    let promoter = match row.promoter_id {
        Some(pid) => promoters.iter().find(|p| p.id == Some(pid)),
        None => resolve(&row.contact_label, promoters),
    };
    if let Some(p) = promoter {
        let cid = p.channel_id.or_else(|| {
            p.channel_name
                .as_deref()
                .and_then(|name| resolve(name, channels))
                .and_then(|c| c.id)
        });
        if cid.is_some() {
            return cid;
        }
    }

    resolve_channel_by_source(&row.source, channels).and_then(|c| c.id)
}

/// 统计行是否归属推广人: 已关联推广人, 或联系名能匹配到推广人
fn is_promoter_attributed(row: &OrderStatRow, promoters: &[AppPromoter]) -> bool {
    row.promoter_id.is_some() || resolve(&row.contact_label, promoters).is_some()
}

/// 员工佣金计算
///
/// 渠道费率按全渠道总单量取档(无该渠道员工规则时退回默认规则);
/// 推广人归属的行计下级佣金, 其余计量阶梯佣金;
/// 高价差佣金只对 default 桶中非推广人归属的行产生
pub fn compute_commission(rows: &[OrderStatRow], ctx: &CommissionContext) -> CommissionReport {
    let part = partition_rules(ctx.rules);

    let grand_total: i64 = rows.iter().map(|r| r.order_count).sum();
    let default_rate = resolve_percentage(grand_total, &part.default_user);

    let mut buckets: BTreeMap<Option<i64>, Vec<&OrderStatRow>> = BTreeMap::new();
    for row in rows {
        buckets
            .entry(bucket_for_row(row, ctx.promoters, ctx.channels))
            .or_default()
            .push(row);
    }

    let mut report = CommissionReport::default();
    for (bucket, bucket_rows) in buckets {
        let channel_name = bucket
            .and_then(|cid| ctx.channels.iter().find(|c| c.id == Some(cid)))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| DEFAULT_CHANNEL_BUCKET.to_string());

        let channel_rate = match bucket {
            Some(cid) => part
                .channel_user
                .get(&cid)
                .map(|rules| resolve_percentage(grand_total, rules))
                .unwrap_or(default_rate),
            None => default_rate,
        };

        let mut cc = ChannelCommission {
            channel: channel_name,
            ..Default::default()
        };
        for row in bucket_rows {
            cc.order_count += row.order_count;
            cc.total_revenue += row.total_revenue;

            if is_promoter_attributed(row, ctx.promoters) {
                cc.subordinate += row.total_revenue * channel_rate / 100.0;
            } else {
                cc.volume_gradient += row.total_revenue * default_rate / 100.0;
                if bucket.is_none() {
                    cc.high_ticket += row.high_ticket_base * ctx.high_ticket_rate / 100.0;
                }
            }
        }
        cc.promoter_percentage = bucket
            .and_then(|cid| part.channel_promoter.get(&cid))
            .map(|rules| resolve_percentage(cc.order_count, rules))
            .unwrap_or(0.0);
        cc.total = cc.volume_gradient + cc.subordinate + cc.high_ticket;

        report.volume_gradient += cc.volume_gradient;
        if cc.channel.contains(PEER_CHANNEL_KEYWORD) {
            report.subordinate_peer += cc.subordinate;
        } else {
            report.subordinate_agent += cc.subordinate;
        }
        report.high_ticket += cc.high_ticket;
        report.employee_total += cc.total;
        report.channels.push(cc);
    }
    report
}

/// 佣金服务: 拉取快照并计算员工佣金报表
pub struct CommissionService {
    rb: Arc<RBatis>,
    stats: Arc<StatsService>,
}

impl CommissionService {
    pub fn new(rb: Arc<RBatis>, stats: Arc<StatsService>) -> Self {
        Self { rb, stats }
    }

    pub async fn compute_commission_report(&self, user_id: i64) -> AppResult<CommissionReport> {
        let rb = self.rb.as_ref();
        let user = SysUser::select_by_id(rb, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("error.user_not_found"))?;

        // 无账户组或规则为空按 0% 出报表, 不视为错误
        let (rules, high_ticket_rate) = match user.group_id {
            Some(gid) => {
                let group = AppAccountGroup::select_by_id(rb, gid).await?;
                let rules = AppCommissionRule::select_by_group(rb, gid).await?;
                if rules.is_empty() {
                    log::warn!("账户组 {} 没有配置佣金规则, 员工 {} 按 0% 计算", gid, user_id);
                }
                (rules, group.map(|g| g.high_ticket_rate).unwrap_or(0.0))
            }
            None => {
                log::warn!("员工 {} 未分配账户组, 按 0% 计算", user_id);
                (Vec::new(), 0.0)
            }
        };

        let rows = self.stats.stat_rows(Some(user_id)).await?;
        let promoters = AppPromoter::select_all(rb).await?;
        let channels = AppChannelConfig::select_all(rb).await?;

        let ctx = CommissionContext {
            rules: &rules,
            high_ticket_rate,
            promoters: &promoters,
            channels: &channels,
        };
        Ok(compute_commission(&rows, &ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(
        scope: i32,
        channel_id: Option<i64>,
        min: i32,
        max: Option<i32>,
        pct: f64,
    ) -> AppCommissionRule {
        AppCommissionRule {
            id: None,
            group_id: 1,
            scope,
            channel_id,
            min_count: min,
            max_count: max,
            percentage: pct,
            create_time: None,
            update_time: None,
        }
    }

    fn promoter(id: i64, name: &str, channel_id: Option<i64>) -> AppPromoter {
        AppPromoter {
            id: Some(id),
            name: name.to_string(),
            channel_id,
            channel_name: None,
            creator_id: None,
            create_time: None,
            update_time: None,
        }
    }

    fn channel(id: i64, name: &str) -> AppChannelConfig {
        AppChannelConfig {
            id: Some(id),
            name: name.to_string(),
            auto_settlement: Some(false),
            create_time: None,
            update_time: None,
        }
    }

    fn row(
        channel_id: Option<i64>,
        promoter_id: Option<i64>,
        label: &str,
        count: i64,
        revenue: f64,
        high_base: f64,
    ) -> OrderStatRow {
        OrderStatRow {
            creator_id: 1,
            source: String::new(),
            promoter_id,
            channel_id,
            contact_label: label.to_string(),
            order_count: count,
            total_revenue: revenue,
            refunded_amount: 0.0,
            high_ticket_base: high_base,
        }
    }

    #[test]
    fn test_resolve_percentage_boundaries() {
        let rules = vec![
            rule(0, None, 0, Some(10), 5.0),
            rule(0, None, 11, None, 8.0),
        ];
        let refs: Vec<&AppCommissionRule> = rules.iter().collect();
        assert_eq!(resolve_percentage(0, &refs), 5.0);
        assert_eq!(resolve_percentage(10, &refs), 5.0);
        assert_eq!(resolve_percentage(11, &refs), 8.0);
        assert_eq!(resolve_percentage(1000, &refs), 8.0);
    }

    #[test]
    fn test_resolve_percentage_empty_and_gap() {
        assert_eq!(resolve_percentage(5, &[]), 0.0);
        // 区间之间有空洞时不命中
        let rules = vec![rule(0, None, 10, Some(20), 5.0)];
        let refs: Vec<&AppCommissionRule> = rules.iter().collect();
        assert_eq!(resolve_percentage(5, &refs), 0.0);
    }

    #[test]
    fn test_resolve_percentage_overlap_first_wins() {
        let rules = vec![
            rule(0, None, 0, Some(10), 5.0),
            rule(0, None, 5, Some(20), 9.0),
        ];
        let refs: Vec<&AppCommissionRule> = rules.iter().collect();
        assert_eq!(resolve_percentage(7, &refs), 5.0);
    }

    #[test]
    fn test_validate_rules() {
        let ok = vec![
            rule(0, None, 0, Some(10), 5.0),
            rule(0, None, 11, None, 8.0),
        ];
        assert!(validate_rules(&ok).is_ok());

        let overlap = vec![
            rule(0, None, 0, Some(10), 5.0),
            rule(0, None, 10, None, 8.0),
        ];
        assert!(validate_rules(&overlap).is_err());

        let unbounded_then_more = vec![
            rule(0, None, 0, None, 5.0),
            rule(0, None, 20, None, 8.0),
        ];
        assert!(validate_rules(&unbounded_then_more).is_err());

        let bad_pct = vec![rule(0, None, 0, None, 120.0)];
        assert!(validate_rules(&bad_pct).is_err());

        // 不同渠道的区间互不影响
        let cross_channel = vec![
            rule(0, Some(1), 0, Some(10), 5.0),
            rule(0, Some(2), 0, Some(10), 6.0),
        ];
        assert!(validate_rules(&cross_channel).is_ok());
    }

    #[test]
    fn test_bucket_fallback_chain() {
        let promoters = vec![promoter(1, "小王", Some(2))];
        let channels = vec![channel(1, "零售"), channel(2, "同行渠道"), channel(3, "芝麻租机")];

        // 显式渠道优先
        assert_eq!(
            bucket_for_row(&row(Some(1), None, "小王", 1, 0.0, 0.0), &promoters, &channels),
            Some(1)
        );
        // 推广人所属渠道
        assert_eq!(
            bucket_for_row(&row(None, None, "小王", 1, 0.0, 0.0), &promoters, &channels),
            Some(2)
        );
        // 来源编码候选
        let mut r = row(None, None, "", 1, 0.0, 0.0);
        r.source = "zfb".to_string();
        assert_eq!(bucket_for_row(&r, &promoters, &channels), Some(3));
        // 都找不到进 default 桶
        assert_eq!(
            bucket_for_row(&row(None, None, "", 1, 0.0, 0.0), &promoters, &channels),
            None
        );
    }

    #[test]
    fn test_channel_rate_uses_grand_total_count() {
        // 默认规则 0-10 单 5% / 11 单起 8%; 渠道规则 0-10 单 10% / 11 单起 20%
        let rules = vec![
            rule(0, None, 0, Some(10), 5.0),
            rule(0, None, 11, None, 8.0),
            rule(0, Some(2), 0, Some(10), 10.0),
            rule(0, Some(2), 11, None, 20.0),
        ];
        let promoters = vec![promoter(1, "小王", Some(2))];
        let channels = vec![channel(2, "同行渠道")];
        // 渠道内 4 单, 但全渠道总单量 12, 渠道费率按 12 取 20%
        let rows = vec![
            row(None, None, "散客", 8, 800.0, 0.0),
            row(Some(2), Some(1), "小王", 4, 400.0, 0.0),
        ];
        let ctx = CommissionContext {
            rules: &rules,
            high_ticket_rate: 0.0,
            promoters: &promoters,
            channels: &channels,
        };
        let report = compute_commission(&rows, &ctx);
        // 散客: 800 * 8%, 推广人行: 400 * 20%
        assert!((report.volume_gradient - 64.0).abs() < 0.01);
        assert!((report.subordinate_peer - 80.0).abs() < 0.01);
        assert_eq!(report.subordinate_agent, 0.0);
    }

    #[test]
    fn test_channel_without_rules_falls_back_to_default() {
        let rules = vec![rule(0, None, 0, None, 5.0)];
        let promoters = vec![promoter(1, "小张", Some(7))];
        let channels = vec![channel(7, "渠道代理A")];
        let rows = vec![row(Some(7), Some(1), "小张", 2, 1000.0, 0.0)];
        let ctx = CommissionContext {
            rules: &rules,
            high_ticket_rate: 0.0,
            promoters: &promoters,
            channels: &channels,
        };
        let report = compute_commission(&rows, &ctx);
        assert!((report.subordinate_agent - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_high_ticket_only_default_bucket_non_promoter() {
        let rules = vec![rule(0, None, 0, None, 10.0)];
        let promoters = vec![promoter(1, "小王", Some(2))];
        let channels = vec![channel(2, "同行渠道")];
        let rows = vec![
            // default 桶散客行: 产生高价差佣金
            row(None, None, "散客", 1, 100.0, 50.0),
            // 渠道桶推广人行: 有高价差基数也不产生
            row(Some(2), Some(1), "小王", 1, 100.0, 50.0),
        ];
        let ctx = CommissionContext {
            rules: &rules,
            high_ticket_rate: 20.0,
            promoters: &promoters,
            channels: &channels,
        };
        let report = compute_commission(&rows, &ctx);
        assert!((report.high_ticket - 10.0).abs() < 0.01);
        let default_bucket = report
            .channels
            .iter()
            .find(|c| c.channel == DEFAULT_CHANNEL_BUCKET)
            .unwrap();
        assert!((default_bucket.high_ticket - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_report_totals_invariant() {
        let rules = vec![
            rule(0, None, 0, Some(10), 5.0),
            rule(0, None, 11, None, 8.0),
            rule(0, Some(2), 0, None, 12.0),
            rule(1, Some(2), 0, None, 3.0),
        ];
        let promoters = vec![promoter(1, "小王", Some(2)), promoter(2, "小李", Some(3))];
        let channels = vec![channel(2, "同行渠道"), channel(3, "兼职代理")];
        let rows = vec![
            row(None, None, "散客A", 5, 523.4, 80.0),
            row(None, None, "散客B", 3, 311.2, 0.0),
            row(Some(2), Some(1), "小王", 4, 860.0, 120.0),
            row(None, None, "小李", 2, 199.9, 30.0),
        ];
        let ctx = CommissionContext {
            rules: &rules,
            high_ticket_rate: 15.0,
            promoters: &promoters,
            channels: &channels,
        };
        let report = compute_commission(&rows, &ctx);

        let channel_sum: f64 = report.channels.iter().map(|c| c.total).sum();
        let parts = report.volume_gradient
            + report.subordinate_peer
            + report.subordinate_agent
            + report.high_ticket;
        assert!((parts - channel_sum).abs() < 0.01);
        assert!((report.employee_total - channel_sum).abs() < 0.01);
        // 小王行走同行桶, 小李经推广人渠道落入代理桶
        assert!(report.subordinate_peer > 0.0);
        assert!(report.subordinate_agent > 0.0);
    }

    #[test]
    fn test_empty_rules_zero_report() {
        let promoters: Vec<AppPromoter> = Vec::new();
        let channels: Vec<AppChannelConfig> = Vec::new();
        let rows = vec![row(None, None, "散客", 3, 300.0, 40.0)];
        let ctx = CommissionContext {
            rules: &[],
            high_ticket_rate: 0.0,
            promoters: &promoters,
            channels: &channels,
        };
        let report = compute_commission(&rows, &ctx);
        assert_eq!(report.employee_total, 0.0);
        assert_eq!(report.channels.len(), 1);
    }
}
