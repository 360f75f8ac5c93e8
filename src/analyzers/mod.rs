//! Market concentration analyses.
//!
//! Observations are classified into airline groups and summed
//! ([`aggregate`]), turned into shares and Herfindahl-Hirschman indices
//! ([`hhi`]), and tiered and trended ([`concentration`], [`trend`]). The
//! pipelines in [`slots`], [`airport`], [`route`] and [`expansion`] build on
//! those; [`analyzer`] wires them to files.

pub mod aggregate;
pub mod airport;
pub mod analyzer;
pub mod concentration;
pub mod expansion;
pub mod hhi;
pub mod route;
pub mod slots;
pub mod trend;
pub mod types;
pub mod utility;
