//! Core utilities: logical time management

pub mod time;
