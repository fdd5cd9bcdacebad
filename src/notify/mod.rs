pub mod dispatcher;
mod worker;

pub use dispatcher::{run_once, DeliveryOutcome};
pub use worker::{start_dispatcher, DispatcherHandle};
