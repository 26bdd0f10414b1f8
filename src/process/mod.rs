// src/process/mod.rs

pub mod extract;
pub mod raw_table;
pub mod utils;

pub use extract::extract_page;
pub use raw_table::RawTable;
