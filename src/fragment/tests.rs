//! Unit tests for fragment parsing and re-assembly.
//!
//! Tests are split into focused submodules to keep each file short and easy
//! to navigate.
