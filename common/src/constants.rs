/// 应用常量定义

/// 订单状态
pub mod order_status {
    /// 租赁中
    pub const RENTING: i32 = 0;
    /// 已逾期
    pub const OVERDUE: i32 = 1;
    /// 已完成(买断/归还)
    pub const FINISHED: i32 = 2;
    /// 已关闭/已退款 - 终态, 不计入订单量和营收
    pub const CLOSED: i32 = 9;

    /// 已关闭订单只计入退款金额
    pub fn is_closed(status: i32) -> bool {
        status == CLOSED
    }
}

/// 零售渠道名称, 系统保证存在(缺失时自动创建)
pub const RETAIL_CHANNEL_NAME: &str = "零售";

/// 渠道名称包含此关键字时, 下级分佣计入"同行"桶, 否则计入"代理"桶
pub const PEER_CHANNEL_KEYWORD: &str = "同行";

/// 佣金报表中未能归属到具体渠道的统计行所在的桶
pub const DEFAULT_CHANNEL_BUCKET: &str = "default";

/// 订单来源编码 -> 渠道名称候选列表(含别名)
///
/// 线上订单只带来源编码, 通过此表找渠道配置:
/// 第一个名称命中渠道配置表的渠道生效
pub fn channel_candidates_for_source(source_code: &str) -> &'static [&'static str] {
    match source_code.trim().to_lowercase().as_str() {
        "rrz" => &["人人租", "人人租机"],
        "zfb" | "zmzj" => &["支付宝", "芝麻租机"],
        "jd" => &["京东", "京东小时租"],
        "xianyu" | "xy" => &["闲鱼", "闲鱼租"],
        "dy" => &["抖音", "抖音小店"],
        "offline" | "store" => &["门店", "零售"],
        _ => &[],
    }
}

/// 回填任务常量
pub mod backfill {
    /// 每更新多少单打印一次进度日志
    pub const PROGRESS_LOG_INTERVAL: usize = 100;

    /// 未匹配记录最多打印多少条日志, 超出只计数, 避免刷屏
    pub const MISS_LOG_LIMIT: usize = 20;
}
