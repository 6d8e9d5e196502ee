//! Application context and the polling loop

mod app_context;
mod update_manager;

pub use app_context::AppContext;
pub use update_manager::UpdateManager;
