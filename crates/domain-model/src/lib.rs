pub mod dirent;
pub mod file_tree;
pub mod metadata;
pub mod template;
pub mod sync_plan;
pub mod action;

pub use dirent::*;
pub use file_tree::*;
pub use metadata::*;
pub use template::*;
pub use sync_plan::*;
pub use action::*;
