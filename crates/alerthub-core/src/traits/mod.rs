//! Core traits defined in `alerthub-core` and implemented by other crates.

pub mod task_queue;

pub use task_queue::TaskQueue;
