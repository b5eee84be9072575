//! Quiz Challenge backend library: grading, question bank, game sessions,
//! admin tools and the Axum router. The binary in `main.rs` only wires these up.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod grading;
pub mod logic;
pub mod openai;
pub mod protocol;
pub mod routes;
pub mod seeds;
pub mod session;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod util;
