use actix_web::{get, web, Responder};
use common::error::AppError;
use common::response::R;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub user_id: i64,
}

/// GET /api/commission/report?user_id=1
/// 员工佣金报表
#[get("/api/commission/report")]
pub async fn commission_report(
    query: web::Query<ReportQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    log::info!("收到佣金报表请求: user_id={}", query.user_id);
    let report = state
        .commission_service
        .compute_commission_report(query.user_id)
        .await?;
    R::success(report)
}
