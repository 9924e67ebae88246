//! Shared utility modules used across Lumen components.

pub mod id;
