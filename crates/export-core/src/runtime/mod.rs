//! Runtime detection for the external toolchain

pub mod check;

pub use check::{check_node, check_program, check_toolchain, missing_summary, RuntimeInfo};
