//! Shared utilities for the upload backend services

pub mod database;
pub mod observability;
