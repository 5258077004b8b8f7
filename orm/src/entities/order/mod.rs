pub mod app_rent_order;
pub mod app_rent_order_extend;

pub use app_rent_order::AppRentOrder;
pub use app_rent_order_extend::AppRentOrderExtend;
