//! integrated tests
pub mod toolkit;

mod framing;
mod navigation;
