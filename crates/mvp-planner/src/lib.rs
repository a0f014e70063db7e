pub mod benchmarks;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod planning;
pub mod scoring;
pub mod telemetry;
