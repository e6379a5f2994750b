// handlers/elevated/admin/mod.rs - ADMIN-only handlers

pub mod revenue;
pub mod system;
pub mod users;
