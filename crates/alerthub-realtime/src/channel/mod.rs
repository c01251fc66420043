//! Topic groups.

pub mod group;
pub mod registry;
pub mod subscription;

pub use registry::GroupRegistry;
