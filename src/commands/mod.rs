pub mod list;
pub mod token;
pub mod version;

pub use list::list_command;
pub use token::token_command;
pub use version::{version_command, versions_command};
