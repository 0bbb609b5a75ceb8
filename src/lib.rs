// Library for tests to access modules

pub mod appliance_client;
pub mod checks;
pub mod cli;
pub mod config;
pub mod counter_store;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod rate;
pub mod report;
pub mod threshold;
pub mod version;
