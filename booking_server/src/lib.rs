//! # Venue Booking Gateway server
//!
//! The HTTP front-end for the booking engine. It wires the engine's APIs to actix-web routes, hosts the Stripe
//! integration (payment requests and webhook verification) and the file-based contract renderer, and maps engine
//! errors to HTTP responses.
//!
//! Run it with [`server::run_server`]; configuration comes from the environment via
//! [`config::ServerConfig::from_env_or_default`].

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
