//! `stationsplit-registry`: blocking Wavelog API client.

pub mod client;

pub use client::{
    find_created_id, BatchOutcome, CreationResult, NewStation, RegistryClient, RegistryError,
};
