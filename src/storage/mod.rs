mod history;
pub mod models;
mod registry;

pub use history::HistoryLog;
pub use registry::UserRegistry;
