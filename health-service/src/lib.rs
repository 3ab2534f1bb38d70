pub mod checks;
pub mod config;
pub mod services;
pub mod startup;
