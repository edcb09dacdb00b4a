// Output generation module

pub mod report;

pub use report::*;
