#![forbid(unsafe_code)]

pub mod backend;
pub mod chart;
pub mod classify;
pub mod config;
pub mod datamodel;
pub mod http;
pub mod poller;
pub mod promql;
pub mod store;
pub mod timeseries;
pub mod units;
