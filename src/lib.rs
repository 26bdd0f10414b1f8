// src/lib.rs

pub mod batch;
pub mod config;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod observe;
pub mod period;
pub mod pipeline;
pub mod policy;
pub mod process;
pub mod schema;
pub mod write;

pub use config::Config;
pub use error::EtlError;
pub use period::Period;
pub use pipeline::Pipeline;
