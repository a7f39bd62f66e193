//! Mod overlay resolution.
//!
//! This crate decides which mod packages are active and which physical file
//! answers a logical path such as `maps/town.txt`. It provides:
//!
//! - **Dependency resolution**: requested packages plus their `depends`,
//!   ordered so every package activates after what it depends on
//! - **Search roots**: override root, active packages (last activated
//!   first), the fallback package, then the built-in data directory
//! - **Overlay lookup**: highest-priority file for a path, with a cache
//! - **Listing**: every provider of a file or directory, lowest priority first
//! - **Provenance**: which root would serve a path and why
//!
//! # Example
//!
//! ```no_run
//! use modkit_overlay::{EngineVersion, ModSession, SessionConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::new("/opt/game/data", EngineVersion::new(1, 0))
//!     .with_user_dir("/home/player/.local/share/game");
//!
//! let session = ModSession::start(config)?;
//! println!("Active: {}", session.activation_order().join(", "));
//!
//! if let Some(path) = session.locate("maps/town.txt")? {
//!     println!("maps/town.txt -> {}", path);
//! }
//! for path in session.list("enemies", true)? {
//!     println!("{}", path);
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod error;
pub mod overlay;
pub mod paths;
pub mod resolver;
pub mod session;
pub mod utils;

// Re-export main types
pub use catalog::{PackageCatalog, PackageSource};
pub use error::{Error, Result};
pub use overlay::{Candidate, OverlayResolver};
pub use paths::{PathSet, Root, RootKind};
pub use resolver::{DependencyResolver, Resolution, ResolveWarning, ResolvedPackage};
pub use session::{ModSession, SessionConfig, OVERRIDE_DIR_NAME, PACKAGES_DIR_NAME};
pub use utils::{normalize_logical_path, normalize_logical_prefix};

pub use modkit_manifest::{
    EngineVersion, PackageDescriptor, VersionRange, ACTIVE_LIST_FILE_NAME, FALLBACK_PACKAGE,
    MANIFEST_FILE_NAME,
};
