// Format-specific modules
pub mod heic;

// Re-export format-specific functions for external use
pub use heic::{decode_heic, is_heic_path};
