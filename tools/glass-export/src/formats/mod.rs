//! Output formats: USD ASCII layers and USDZ containers

pub mod usda;
pub mod usdz;

pub use usda::{usda_to_bytes, write_usda};
pub use usdz::{package_usdz, write_usdz, Compression, USDZ_ALIGNMENT};
