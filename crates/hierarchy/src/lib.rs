pub mod builder;
pub mod loader;
pub mod filters;
pub mod tree;

pub use builder::build_filesystem;
pub use loader::{load_local_entries, load_local_filesystem, load_remote_entries, load_remote_filesystem, ProgressCb};
pub use filters::*;
pub use tree::{render_filesystem, render_tree};
