//! Client for a market-research analysis service: upload a dataset, then chat
//! with the assistant about it.

pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod message;
pub mod services;
pub mod state;

pub const TRACING_TARGET_UPLOAD: &str = "insight_chat::upload";
pub const TRACING_TARGET_CHAT: &str = "insight_chat::chat";
pub const TRACING_TARGET_STORE: &str = "insight_chat::store";
pub const TRACING_TARGET_BACKEND: &str = "insight_chat::backend";
