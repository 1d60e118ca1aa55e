pub mod auth;
pub mod gym;
pub mod lead;
pub mod user;
