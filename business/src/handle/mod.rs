pub mod commission;
pub mod order;
pub mod stats;
