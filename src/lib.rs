pub mod analyzers;
pub mod config;
pub mod groups;
pub mod loader;
pub mod output;
pub mod parser;
pub mod routes;
