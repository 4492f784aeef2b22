pub mod account;
pub mod catalog;
pub mod message;
pub mod status;
pub mod user;
