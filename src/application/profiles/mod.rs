//! Profile use-cases: public metadata and the follow graph

pub mod service;

pub use service::ProfileService;
