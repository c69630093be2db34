//! This crate contains a simple framework for building LearnFi agents.
//! It has common utils and tools for configuring an agent, instantiating the
//! content registry client, and running to completion.
//!
//! Settings parsers live here, while config json files live with their agent.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Settings and configuration from file
pub mod settings;

/// Base trait for an agent
pub mod agent;

#[doc(hidden)]
#[macro_use]
pub mod macros;
