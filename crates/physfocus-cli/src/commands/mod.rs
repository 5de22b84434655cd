pub mod ask;
pub mod config;
pub mod study;
pub mod timer;
