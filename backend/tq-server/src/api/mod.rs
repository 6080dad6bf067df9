pub mod consumers;
pub mod error;
pub mod extractors;
pub mod messages;
pub mod tenants;
