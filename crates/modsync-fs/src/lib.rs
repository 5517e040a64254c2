//! Filesystem primitives for the modsync content cache and installer.
//!
//! Every write that lands in a shared location goes through a staging file in
//! the destination directory and is renamed into place only once it is
//! complete, so readers never observe a partially written file.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> modsync_fs::Result<()> {
//! use modsync_fs::StagedFile;
//!
//! let mut staged = StagedFile::create("/tmp/cache/abc123").await?;
//! staged.write_all(b"payload").await?;
//! staged.commit().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod primitives;
mod sanitize;

pub use error::{Error, Result};
pub use primitives::{
    StagedFile, atomic_read, atomic_write, copy_file, ensure_parent, is_dir, remove_dir_all,
};
pub use sanitize::relative_path;
