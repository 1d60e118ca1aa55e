pub mod auth;
pub mod google_oauth;
pub mod gym_service;
pub mod lead_mutation;
pub mod lead_query;
pub mod lead_service;
pub mod phone_verification;
pub mod user_service;
