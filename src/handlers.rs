// src/handlers.rs

pub mod auth;
pub mod gyms;
pub mod leads;
pub mod users;
