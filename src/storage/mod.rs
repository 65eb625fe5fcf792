//! Storage Module
//!
//! The filesystem adapter the dispatcher calls into.
//!
//! ## Layout
//! - `manager`: operations on files and directories under the root
//! - `naming`: `-copia` candidates for uploads that would collide

mod manager;
mod naming;

pub use manager::{base_name, fill_new, StorageManager};
pub use naming::copy_name;
