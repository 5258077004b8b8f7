pub mod app_commission_rule;
pub mod app_account_group;

pub use app_commission_rule::AppCommissionRule;
pub use app_account_group::AppAccountGroup;
