pub mod registry;
pub mod types;

pub use registry::{select_variant, Registry};
pub use types::{PageLayout, VariantMatch, VariantTag};
