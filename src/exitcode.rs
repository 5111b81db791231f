// src/exitcode.rs
//! Process exit codes, following the BSD sysexits convention.

pub const OK: i32 = 0;
pub const USAGE: i32 = 2;
pub const SOFTWARE: i32 = 70;
