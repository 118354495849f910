#![allow(clippy::async_fn_in_trait)]
pub mod common;
pub mod server;
pub mod storage;
pub mod traits;

pub use server::cluster_service::ClusterService;
