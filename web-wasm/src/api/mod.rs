pub mod backend;

pub use backend::{js_error_message, FetchApi};
