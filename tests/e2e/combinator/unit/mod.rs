//! Per-combinator behavior tests on the virtual-time scheduler.

pub mod merge;
pub mod sequential;
pub mod until;
pub mod zip;
