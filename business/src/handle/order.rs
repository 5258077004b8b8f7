use actix_web::{post, web, Responder};
use common::error::AppError;
use common::response::R;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveReq {
    pub order_id: i64,
}

/// POST /api/order/resolve
/// 识别单个订单的推广人/商品/渠道并落库(外键只在为空时写入)
#[post("/api/order/resolve")]
pub async fn resolve_order(
    req: web::Json<ResolveReq>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let links = state.backfill_service.resolve_order(req.order_id).await?;
    R::success(links)
}

#[derive(Debug, Default, Deserialize)]
pub struct BackfillReq {
    /// 不传为全量回填
    #[serde(default)]
    pub creator_id: Option<i64>,
}

/// POST /api/order/backfill
/// 回填历史订单缺失的外键
#[post("/api/order/backfill")]
pub async fn run_backfill(
    req: web::Json<BackfillReq>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    log::info!("收到回填请求: creator_id={:?}", req.creator_id);
    let result = state.backfill_service.run(req.creator_id).await?;
    R::success(result)
}
