use actix_web::{get, web, Responder};
use common::error::AppError;
use common::response::R;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// 不传为管理员全量口径
    #[serde(default)]
    pub creator_id: Option<i64>,
}

/// GET /api/stats/orders?creator_id=1
/// 订单统计行
#[get("/api/stats/orders")]
pub async fn order_stats(
    query: web::Query<StatsQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let rows = state.stats_service.stat_rows(query.creator_id).await?;
    R::success(rows)
}
