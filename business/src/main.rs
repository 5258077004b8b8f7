use std::sync::Arc;
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use actix_web::middleware::Logger;
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;
use common::constants::RETAIL_CHANNEL_NAME;
use common::middleware::error_handler;
use common::{AppConfig, AppResult};
use orm::entities::AppChannelConfig;
use crate::service::backfill_service::BackfillService;
use crate::service::commission_service::CommissionService;
use crate::service::identity_service::IdentityService;
use crate::service::stats_service::StatsService;

mod handle;
mod service;
mod state;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 嵌入配置文件（编译时加载）
    const DEFAULT_CONFIG: &str = include_str!("../config.toml");
    const PROD_CONFIG: &str = include_str!("../config.production.toml");

    let config = AppConfig::from_file_or_embedded(
        "business/config",
        DEFAULT_CONFIG,
        Some(PROD_CONFIG)
    )
    .or_else(|_| AppConfig::from_env())
    .expect("配置加载失败");

    // 初始化日志（使用配置的日志级别）
    std::env::set_var("RUST_LOG", &config.log.level);
    common::init_logger();

    log::info!("启动租赁订单管理服务...");
    log::info!("配置加载成功 - 数据库: {}", config.database.url);

    // 初始化数据库连接
    let db_config = common::DbConfig::new(
        config.database.url.clone(),
        config.database.max_connections as u64,
    );
    common::init_db(&db_config)
        .await
        .expect("数据库连接池初始化失败");

    // 测试数据库连接
    if let Err(e) = common::test_db_connection().await {
        log::error!("数据库连接测试失败: {}", e);
    }

    let rb = Arc::new(common::get_db().clone());

    // 零售渠道兜底, 缺失时自动创建
    if let Err(e) = ensure_retail_channel(rb.as_ref()).await {
        log::error!("零售渠道初始化失败: {}", e);
    }

    // 组装服务依赖
    let stats_service = Arc::new(StatsService::new(rb.clone()));
    let identity_service = Arc::new(IdentityService::new(
        rb.clone(),
        config.resolver.product_aliases.clone(),
    ));
    let commission_service = Arc::new(CommissionService::new(rb.clone(), stats_service.clone()));
    let backfill_service = Arc::new(BackfillService::new(rb.clone(), identity_service.clone()));

    let state = state::AppState {
        rb,
        stats_service,
        identity_service,
        commission_service,
        backfill_service,
    };
    let state_data = web::Data::new(state.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("🚀 启动 Actix Web 服务器: {}", addr);
    HttpServer::new(move || {
        App::new()
            // 全局中间件配置
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            // 注册 JSON 和 Query 错误处理器
            .app_data(error_handler::json_config())
            .app_data(error_handler::query_config())
            // 注册全局数据
            .app_data(state_data.clone())
            .service(handle::commission::commission_report)
            .service(handle::order::resolve_order)
            .service(handle::order::run_backfill)
            .service(handle::stats::order_stats)
    }).bind(&addr)?
        .run()
        .await
}

/// 保证零售渠道存在
async fn ensure_retail_channel(rb: &RBatis) -> AppResult<()> {
    if AppChannelConfig::select_by_name(rb, RETAIL_CHANNEL_NAME)
        .await?
        .is_none()
    {
        let channel = AppChannelConfig {
            id: None,
            name: RETAIL_CHANNEL_NAME.to_string(),
            auto_settlement: Some(false),
            create_time: Some(DateTime::now()),
            update_time: Some(DateTime::now()),
        };
        AppChannelConfig::insert(rb, &channel).await?;
        log::info!("零售渠道不存在, 已自动创建");
    }
    Ok(())
}
