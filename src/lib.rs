//! Discipline Library
//!
//! Nutrition targets, recipe composition and daily macro logging.

pub mod build_info;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod photo;
pub mod tools;
