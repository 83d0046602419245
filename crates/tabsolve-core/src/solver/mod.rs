pub mod action;
mod arena;
pub mod config;
pub mod debug;
pub mod error;
pub mod grounding;
pub mod hashing;
pub mod ids;
pub mod options;
pub mod reward;
pub mod snapshot;
pub mod state;

#[cfg(test)]
mod tests;
