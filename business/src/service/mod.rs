pub mod stats_service;
pub mod identity_service;
pub mod commission_service;
pub mod backfill_service;
