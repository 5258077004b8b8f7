use std::sync::Arc;
use rbatis::RBatis;
use crate::service::backfill_service::BackfillService;
use crate::service::commission_service::CommissionService;
use crate::service::identity_service::IdentityService;
use crate::service::stats_service::StatsService;

#[derive(Clone)]
pub struct AppState {
    pub rb: Arc<RBatis>,
    pub stats_service: Arc<StatsService>,
    pub identity_service: Arc<IdentityService>,
    pub commission_service: Arc<CommissionService>,
    pub backfill_service: Arc<BackfillService>,
}
