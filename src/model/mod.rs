//! Data structures shared by the extractors and the template builder

// Declare all submodules
mod build;
mod config;
mod material;

// Re-export all public types from material module
pub use material::{FaceMatGroup, MaterialScan};

// Re-export all public types from build module
pub use build::{BuildResult, BuildWarning, PatchTarget};

// Re-export all public types from config module
pub use config::{BuildConfig, DEFAULT_FALLBACK_REF, PairingPolicy, TemplateLayout};
