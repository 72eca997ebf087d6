pub mod error;
pub mod explorer;
pub mod models;
pub mod perf;
pub mod provider;
pub mod state;
pub mod tree;
pub mod widget;

pub use error::{Error, Result};
