pub mod order;
pub mod promoter;
pub mod channel;
pub mod product;
pub mod commission;
pub mod system;

// Re-export all entities
pub use order::*;
pub use promoter::*;
pub use channel::*;
pub use product::*;
pub use commission::*;
pub use system::*;
