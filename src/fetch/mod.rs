// src/fetch/mod.rs

pub mod source;
pub mod urls;
pub mod workbook;

pub use source::{retrieve, HttpSource, Source};
pub use urls::Locations;
pub use workbook::{Cell, Workbook};
