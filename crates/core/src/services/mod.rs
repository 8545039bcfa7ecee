pub mod portfolio_service;
pub mod rebalance_service;
pub mod summary_service;
