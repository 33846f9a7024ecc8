//! Concrete implementations of the engine's collaborator traits.

pub mod renderer;
pub mod stripe;
