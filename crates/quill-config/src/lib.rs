pub mod schema;
pub mod store;

pub use schema::{StoreState, WindowBounds};
pub use store::load_store;
