//! Nourish Library
//!
//! Medically safe, household-scaled recipe recommendations.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod recommend;
pub mod safety;
pub mod tools;
