pub mod analyzers;
pub mod config;
pub mod geo;
pub mod loader;
pub mod output;
pub mod parser;
pub mod query;
pub mod record;
pub mod stats;
pub mod store;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
