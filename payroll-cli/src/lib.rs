pub mod app;
pub mod cli;
pub mod logging;

pub use app::{EXIT_FAILURE, EXIT_INVALID_INPUT, EXIT_OK, Reply};
pub use cli::{Cli, RequestSource};
