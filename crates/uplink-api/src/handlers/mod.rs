//! HTTP handlers

pub mod health;
pub mod notification;
pub mod signed_url;
pub mod upload;
