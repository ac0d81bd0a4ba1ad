//! Model serialization.
//!
//! Numeric artifacts are persisted in the `SafeTensors` format so they can
//! be inspected and converted by standard tooling.

pub mod safetensors;
