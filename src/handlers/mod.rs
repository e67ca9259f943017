//! HTTP handlers

pub mod diagnose;
pub mod feedback;
pub mod health;
pub mod model;
pub mod predict;
