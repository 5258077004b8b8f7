pub mod app_promoter;

pub use app_promoter::AppPromoter;
