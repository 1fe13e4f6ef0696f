//! KW launcher command-line front end.
//!
//! Wraps [`kw_update::UpdateEngine`] with player-facing status text and
//! starts the game client once the install is current.

pub mod cli;
pub mod launch;
pub mod status;
pub mod update_cmd;

pub use launch::{LaunchError, LaunchPlan};
pub use update_cmd::{LauncherSession, UpdateSummary, resolve_install_root};
