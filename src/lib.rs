pub mod catalog;
pub mod config;
pub mod i18n;
pub mod normalize;
pub mod provider;
pub mod reconcile;
pub mod retry;
