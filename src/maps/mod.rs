//! Street maps built in code rather than loaded.

pub mod grid;
