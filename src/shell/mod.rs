//! Process execution, privilege elevation and resume checkpoints.

pub mod command;
pub mod elevate;
pub mod platform;
pub mod resume;

pub use command::{program_succeeds, run_program, CommandOptions, CommandResult};
pub use elevate::{Elevation, SystemElevation};
pub use platform::{is_ci, is_elevated};
pub use resume::ResumeState;
