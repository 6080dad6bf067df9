pub mod delivery;
pub mod gateway;
pub mod in_memory;
pub mod unavailable;
