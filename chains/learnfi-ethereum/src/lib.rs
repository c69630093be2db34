//! Interfaces to the LearnFi content registry on Ethereum-compatible chains.
//!
//! The registry client here owns the whole submission pipeline for one
//! deployment: building unsigned `createContent` calls, signing them with a
//! locally held key, broadcasting, and waiting for receipts. The ABI is read
//! at startup from a compiler artifact rather than baked in at build time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]

mod abi;
mod content_store;

pub use abi::ContractArtifact;
pub use content_store::{ContentRegistry, SignedTx, UnsignedTx};
