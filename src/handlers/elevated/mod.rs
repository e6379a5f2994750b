// handlers/elevated/mod.rs - ADMIN-only routes

pub mod admin;
