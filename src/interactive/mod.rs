//! Interactive visualization module for real-time noise testing

mod viewer;

pub use viewer::{InteractiveViewer, ViewerConfig};
