pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use adapters::{FileRosterSource, HttpRosterSource, SiteSource};
pub use core::page::RosterPage;
pub use core::renderer::RosterRenderer;
pub use core::site::{SiteEngine, SiteReport};
pub use utils::error::{LoadError, Result, RosterError};
