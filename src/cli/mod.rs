pub mod app;

pub use app::{Cli, Commands};
