pub mod cluster_heartbeat;
pub mod cluster_service;
pub mod election;
pub mod loader;
pub mod scheduler;
