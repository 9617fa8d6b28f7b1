pub mod backend;
pub mod catalog;
pub mod chat;
pub mod dataset;
pub mod persistence;
pub mod session;
pub mod uploader;
