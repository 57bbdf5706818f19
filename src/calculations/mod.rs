pub mod allocation;
pub mod pool_sizing;
pub mod reconcile;

pub use allocation::{AllocationPass, allocate, manual_allocation};
pub use pool_sizing::{PoolSizing, compute_total_amount};
pub use reconcile::{PoolMetrics, reconcile};
