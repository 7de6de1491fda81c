pub mod errors;
pub mod ids;

pub use errors::{ConfigError, QuillError, ServerError, TerminalError};
pub use ids::{PtyId, TabId};

pub type Result<T> = std::result::Result<T, QuillError>;
