pub mod client;

pub use client::{DirectoryApi, DirectoryClient};
