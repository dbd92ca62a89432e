//! Request-independent services used by the handlers.

pub mod device_workflow;
pub mod flash;

pub use device_workflow::{DeleteOutcome, DeviceWorkflow, FormOutcome};
pub use flash::{FlashLevel, FlashMessage};
