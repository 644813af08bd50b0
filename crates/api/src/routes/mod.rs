//! Route handlers

pub mod example;
pub mod predict;
pub mod stream;
pub mod system;
