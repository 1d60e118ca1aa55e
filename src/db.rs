pub mod gym_repo;
pub use gym_repo::GymRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
