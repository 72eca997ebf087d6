//! Explorer controller and the pieces it drives: refresh worker, context actions,
//! query generation and tab requests.

pub mod actions;
pub mod controller;
pub mod query;
pub mod refresh;
pub mod tabs;

pub use actions::{ContextAction, MenuItem, context_actions};
pub use controller::ExplorerController;
pub use query::{select_statement, subscribe_statement};
pub use refresh::{RefreshOutcome, RefreshWorker};
pub use tabs::{CrudOperation, TabLog, TabRequest, TabsFactory};
