pub mod app_product;

pub use app_product::AppProduct;
