pub mod account;
pub mod api;
pub mod catalog;
pub mod encoding;
pub mod error;
pub mod jobs;
pub mod memory;
pub mod merge;
pub mod placeholder;
pub mod qa;
