//! Taskswarm - decentralized task allocation via population games

pub mod core;
pub mod game;
