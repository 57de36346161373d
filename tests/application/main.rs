#[path = "../common/mod.rs"]
#[macro_use]
pub mod common;

pub mod session_test;
