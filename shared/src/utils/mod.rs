//! Utility functions shared across the security workspace

pub mod phone;
