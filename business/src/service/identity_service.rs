use std::collections::HashMap;
use std::sync::Arc;

use common::constants::channel_candidates_for_source;
use common::AppResult;
use orm::entities::{AppChannelConfig, AppProduct, AppPromoter, AppRentOrder};
use rbatis::RBatis;
use serde::Serialize;

/// 注册表条目: 可被自由文本识别的主数据
pub trait RegistryEntry {
    fn entry_id(&self) -> i64;
    fn entry_name(&self) -> &str;
}

impl RegistryEntry for AppPromoter {
    fn entry_id(&self) -> i64 {
        self.id.unwrap_or(0)
    }
    fn entry_name(&self) -> &str {
        &self.name
    }
}

impl RegistryEntry for AppProduct {
    fn entry_id(&self) -> i64 {
        self.id.unwrap_or(0)
    }
    fn entry_name(&self) -> &str {
        &self.name
    }
}

impl RegistryEntry for AppChannelConfig {
    fn entry_id(&self) -> i64 {
        self.id.unwrap_or(0)
    }
    fn entry_name(&self) -> &str {
        &self.name
    }
}

/// 归一化标签: 小写, 去掉所有空白, "pro" -> "p", "plus" -> "+"
///
/// "vivoX300 Pro" 和 "vivoX300p" 归一化后同为 "vivox300p"
pub fn normalize_label(label: &str) -> String {
    let compact: String = label.chars().filter(|c| !c.is_whitespace()).collect();
    compact.to_lowercase().replace("pro", "p").replace("plus", "+")
}

/// 多个候选命中时的裁决: 归一化名最长者优先, 仍并列取 ID 较小者
fn pick_best<'a, T, I>(candidates: I) -> Option<&'a T>
where
    T: RegistryEntry,
    I: Iterator<Item = &'a T>,
{
    candidates.max_by(|a, b| {
        let la = normalize_label(a.entry_name()).chars().count();
        let lb = normalize_label(b.entry_name()).chars().count();
        la.cmp(&lb).then_with(|| b.entry_id().cmp(&a.entry_id()))
    })
}

/// 自由文本标签识别级联, 逐级尝试, 首个命中的层级生效:
///
/// 1. 去空白精确匹配
/// 2. 忽略大小写匹配
/// 3. 包含匹配(标签含候选名或候选名含标签)
/// 4. 归一化匹配(相等或双向包含)
///
/// 没有任何层级命中返回 None, 由调用方记录并留待人工处理
pub fn resolve<'a, T: RegistryEntry>(label: &str, candidates: &'a [T]) -> Option<&'a T> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(hit) = candidates.iter().find(|c| c.entry_name().trim() == trimmed) {
        return Some(hit);
    }

    let lower = trimmed.to_lowercase();
    if let Some(hit) = candidates
        .iter()
        .find(|c| c.entry_name().trim().to_lowercase() == lower)
    {
        return Some(hit);
    }

    let contained = candidates.iter().filter(|c| {
        let name = c.entry_name().trim();
        !name.is_empty() && (trimmed.contains(name) || name.contains(trimmed))
    });
    if let Some(hit) = pick_best(contained) {
        return Some(hit);
    }

    let norm = normalize_label(trimmed);
    if norm.is_empty() {
        return None;
    }
    pick_best(candidates.iter().filter(|c| {
        let n = normalize_label(c.entry_name());
        !n.is_empty() && (n == norm || norm.contains(&n) || n.contains(&norm))
    }))
}

/// 关键字归类: 商品任一关键字出现在订单商品名中即命中
///
/// 用于线上订单自动归类, 优先于通用级联
pub fn classify_by_keywords<'a>(label: &str, products: &'a [AppProduct]) -> Option<&'a AppProduct> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return None;
    }
    pick_best(
        products
            .iter()
            .filter(|p| p.keywords().iter().any(|k| trimmed.contains(k))),
    )
}

/// 按来源编码找渠道: 编码映射出候选渠道名列表(含别名),
/// 候选名顺序即优先级, 第一个命中渠道配置表的渠道生效
pub fn resolve_channel_by_source<'a>(
    source_code: &str,
    channels: &'a [AppChannelConfig],
) -> Option<&'a AppChannelConfig> {
    channel_candidates_for_source(source_code)
        .iter()
        .find_map(|name| channels.iter().find(|c| c.name == *name))
}

/// 一次性加载的主数据快照, 识别与回填共用
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub promoters: Vec<AppPromoter>,
    pub products: Vec<AppProduct>,
    pub channels: Vec<AppChannelConfig>,
}

/// 单个订单的识别结果, 只包含本次新解析出的外键
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedLinks {
    pub promoter_id: Option<i64>,
    pub product_id: Option<i64>,
    pub channel_id: Option<i64>,
}

impl ResolvedLinks {
    pub fn is_empty(&self) -> bool {
        self.promoter_id.is_none() && self.product_id.is_none() && self.channel_id.is_none()
    }
}

/// 识别服务: 把订单上的自由文本字段解析到主数据外键
pub struct IdentityService {
    rb: Arc<RBatis>,
    /// 商品名称别名表, 启动时从配置注入
    product_aliases: HashMap<String, String>,
}

impl IdentityService {
    pub fn new(rb: Arc<RBatis>, product_aliases: HashMap<String, String>) -> Self {
        Self { rb, product_aliases }
    }

    /// 加载识别所需的全部主数据
    pub async fn load_registries(&self) -> AppResult<Registries> {
        let rb = self.rb.as_ref();
        Ok(Registries {
            promoters: AppPromoter::select_all(rb).await?,
            products: AppProduct::select_all(rb).await?,
            channels: AppChannelConfig::select_all(rb).await?,
        })
    }

    /// 商品识别: 别名改写 -> 关键字归类 -> 通用级联
    pub fn resolve_product<'a>(
        &self,
        label: &str,
        products: &'a [AppProduct],
    ) -> Option<&'a AppProduct> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }
        // 人工维护的已知错误名在任何匹配之前改写
        let label = self
            .product_aliases
            .get(trimmed)
            .map(|s| s.as_str())
            .unwrap_or(trimmed);

        if let Some(hit) = classify_by_keywords(label, products) {
            return Some(hit);
        }
        resolve(label, products)
    }

    /// 计算订单缺失外键的识别结果, 纯函数, 不落库
    ///
    /// 已关联的维度一律跳过, 因此对同一订单重复执行结果不变
    pub fn plan_links(&self, order: &AppRentOrder, reg: &Registries) -> ResolvedLinks {
        let mut links = ResolvedLinks::default();

        if order.promoter_id.is_none() {
            if let Some(label) = order.contact_name.as_deref() {
                links.promoter_id = resolve(label, &reg.promoters).and_then(|p| p.id);
            }
        }

        if order.product_id.is_none() {
            if let Some(label) = order.product_name.as_deref() {
                links.product_id = self.resolve_product(label, &reg.products).and_then(|p| p.id);
            }
        }

        if order.channel_id.is_none() {
            if let Some(code) = order.source.as_deref() {
                links.channel_id = resolve_channel_by_source(code, &reg.channels).and_then(|c| c.id);
            }
            // 渠道仍未定时, 用推广人(已关联的或本次识别出的)所属渠道补齐
            if links.channel_id.is_none() {
                let promoter_id = order.promoter_id.or(links.promoter_id);
                if let Some(promoter) = promoter_id
                    .and_then(|pid| reg.promoters.iter().find(|p| p.id == Some(pid)))
                {
                    links.channel_id = promoter.channel_id.or_else(|| {
                        promoter
                            .channel_name
                            .as_deref()
                            .and_then(|name| resolve(name, &reg.channels))
                            .and_then(|c| c.id)
                    });
                }
            }
        }

        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn promoter(id: i64, name: &str) -> AppPromoter {
        AppPromoter {
            id: Some(id),
            name: name.to_string(),
            channel_id: None,
            channel_name: None,
            creator_id: None,
            create_time: None,
            update_time: None,
        }
    }

    fn product(id: i64, name: &str, keywords: Option<&str>) -> AppProduct {
        AppProduct {
            id: Some(id),
            name: name.to_string(),
            match_keywords: keywords.map(|s| s.to_string()),
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

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("vivoX300 Pro"), "vivox300p");
        assert_eq!(normalize_label("vivoX300p"), "vivox300p");
        assert_eq!(normalize_label("iPhone 15 Plus"), "iphone15+");
        assert_eq!(normalize_label("  华为 Mate60 "), "华为mate60");
    }

    #[test]
    fn test_resolve_exact_before_fuzzy() {
        let candidates = vec![product(1, "vivoX300", None), product(2, "vivoX300 Pro", None)];
        // "vivoX300" 同时是 2 号的子串, 但精确匹配先生效
        let hit = resolve("vivoX300", &candidates).unwrap();
        assert_eq!(hit.id, Some(1));
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let candidates = vec![product(1, "vivoX300", None)];
        assert_eq!(resolve("VIVOX300", &candidates).unwrap().id, Some(1));
    }

    #[test]
    fn test_resolve_containment_prefers_longest() {
        let candidates = vec![product(1, "X300", None), product(2, "vivoX300", None)];
        // 两个候选都被 "vivoX300 12+256" 包含, 取归一化名更长的 2 号
        let hit = resolve("vivoX300 12+256", &candidates).unwrap();
        assert_eq!(hit.id, Some(2));
    }

    #[test]
    fn test_resolve_containment_tie_breaks_by_id() {
        let candidates = vec![promoter(7, "小王"), promoter(3, "小李")];
        // 长度并列时取 ID 较小者
        let hit = resolve("小王小李", &candidates).unwrap();
        assert_eq!(hit.id, Some(3));
    }

    #[test]
    fn test_resolve_normalized_stage() {
        let candidates = vec![product(1, "vivoX300p", None)];
        assert_eq!(resolve("vivoX300 Pro", &candidates).unwrap().id, Some(1));
    }

    #[test]
    fn test_resolve_miss_is_none() {
        let candidates = vec![product(1, "vivoX300", None)];
        assert!(resolve("iPhone 15", &candidates).is_none());
        assert!(resolve("   ", &candidates).is_none());
        assert!(resolve("x", &[] as &[AppProduct]).is_none());
    }

    #[test]
    fn test_classify_by_keywords() {
        let products = vec![
            product(1, "vivoX300 Pro", Some("X300 Pro,X300P")),
            product(2, "vivoX300", Some("X300")),
        ];
        // 关键字都命中时取归一化名更长的商品
        let hit = classify_by_keywords("全新 vivoX300 Pro 16+512", &products).unwrap();
        assert_eq!(hit.id, Some(1));
    }

    #[test]
    fn test_product_alias_rewrites_before_matching() {
        let mut aliases = HashMap::new();
        aliases.insert("X300大屏版".to_string(), "vivoX300 Pro+".to_string());
        let svc = IdentityService::new(Arc::new(RBatis::new()), aliases);
        let products = vec![product(1, "vivoX300 Pro+", None)];
        let hit = svc.resolve_product("X300大屏版", &products).unwrap();
        assert_eq!(hit.id, Some(1));
    }

    #[test]
    fn test_resolve_channel_by_source() {
        let channels = vec![channel(1, "零售"), channel(2, "芝麻租机")];
        assert_eq!(resolve_channel_by_source("zfb", &channels).unwrap().id, Some(2));
        assert_eq!(resolve_channel_by_source("store", &channels).unwrap().id, Some(1));
        assert!(resolve_channel_by_source("unknown", &channels).is_none());
    }

    #[test]
    fn test_plan_links_idempotent() {
        let svc = IdentityService::new(Arc::new(RBatis::new()), HashMap::new());
        let mut p = promoter(1, "小王");
        p.channel_id = Some(5);
        let reg = Registries {
            promoters: vec![p],
            products: vec![product(2, "vivoX300", None)],
            channels: vec![channel(5, "同行渠道")],
        };
        let mut order = AppRentOrder {
            id: Some(100),
            order_number: Some("R100".to_string()),
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
            source: Some("offline".to_string()),
            contact_name: Some("小王".to_string()),
            product_name: Some("vivoX300".to_string()),
            create_time: None,
            update_time: None,
        };

        let first = svc.plan_links(&order, &reg);
        assert_eq!(first.promoter_id, Some(1));
        assert_eq!(first.product_id, Some(2));
        // 渠道经推广人所属渠道补齐
        assert_eq!(first.channel_id, Some(5));

        // 外键落库后再执行, 不再产生任何新解析
        order.promoter_id = first.promoter_id;
        order.product_id = first.product_id;
        order.channel_id = first.channel_id;
        let second = svc.plan_links(&order, &reg);
        assert!(second.is_empty());
    }
}
