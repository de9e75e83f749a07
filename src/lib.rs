//! Chunk-oriented batch engine and the two diary jobs built on it.

pub mod batch;
pub mod config;
pub mod jobs;
pub mod migrations;
pub mod models;
pub mod repository;
pub mod schema;
pub mod services;
