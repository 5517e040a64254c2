//! Placing cached module files on disk and deciding which copy of a module is
//! live.
//!
//! - [`Installer`] copies a module's blobs out of the content cache into
//!   `<install root>/<id>/...` and writes its `version.json`.
//! - [`BundleSeeder`] imports a pre-shipped bundle into the content cache.
//! - [`VersionResolver`] compares the bundled and installed manifests of a
//!   module; the installed copy wins only with a strictly greater version.

mod error;
mod installer;
mod layout;
mod resolver;
mod seeder;

pub use error::{InstallError, Result};
pub use installer::Installer;
pub use resolver::{ENTRY_POINT, Location, ModuleInfo, Resolution, VersionResolver};
pub use seeder::BundleSeeder;
