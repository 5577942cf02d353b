//! Document type authoring, user documents and themed PDF rendering over HTTP.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod registry;
pub mod render;
pub mod services;
pub mod state;
pub mod uploads;
pub mod validation;
