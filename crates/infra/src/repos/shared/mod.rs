pub mod inmemory_repo;
pub mod inmemory_scheduling;
