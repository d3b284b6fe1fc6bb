pub mod config;
pub mod envfile;
pub mod error;
pub mod firebase;
pub mod github;
pub mod io;
pub mod link_state;
pub mod manifest;
pub mod metadata;
pub mod paths;
pub mod prompt;
pub mod runner;
pub mod settings;
pub mod step;
pub mod templates;

#[cfg(test)]
mod testing;

pub use error::{Result, ShipError};
