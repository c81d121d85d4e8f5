//! gatewaymaker-core — Exam assembly engine.
//!
//! Parses question fragment files, draws a seeded random subset from each
//! configured set, groups the draw under its instructions and renders a
//! test together with an aligned answer key.

pub mod assembler;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod pool;
pub mod render;
pub mod sampler;

pub use engine::{generate, EngineOptions, ExamEngine};
pub use error::AssemblyError;
