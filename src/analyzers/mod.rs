//! Query-time analytics over stored trip records.
//!
//! Every aggregation goes through [`analyzer::TripAnalyzer`], which applies the
//! same [`filter::FilterCriteria`] predicate before handing the surviving
//! records to one of the algorithms: summary KPIs, busiest-hour ranking, speed
//! histogram or duration mix.

pub mod aggregate;
pub mod analyzer;
pub mod distribution;
pub mod filter;
pub mod histogram;
pub mod ranking;
pub mod types;
pub mod utility;

pub use analyzer::TripAnalyzer;
pub use filter::FilterCriteria;
