pub mod atomic_write;
pub mod dir;
pub mod staged;

pub use atomic_write::{atomic_read, atomic_write, copy_file};
pub use dir::{ensure_parent, is_dir, remove_dir_all};
pub use staged::StagedFile;
