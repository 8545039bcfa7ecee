pub mod action;
pub mod allocation;
pub mod asset;
pub mod ledger;
pub mod portfolio;
pub mod settings;
pub mod summary;
