//! Ready-made mission definitions.

pub mod hello;
pub mod stages;
