// src/handlers/mod.rs
pub mod auth;
pub mod generate;
pub mod jobs;
pub mod upload;
