//! # Dispatch Path
//!
//! Everything between validated parameters and an observed terminal
//! status: the command builder, the capability traits to the external
//! fleet manager and log sink, the dispatcher, and the status poller.
//!
//! Submission and observation are deliberately decoupled operations
//! joined only by the opaque command identifier: an eventual-consistency
//! boundary. A command may be acknowledged before the log sink has any
//! entry for it.

pub mod builder;
pub mod dispatcher;
pub mod external;
pub mod fleet;
pub mod poller;
pub mod types;

pub use builder::CommandTemplate;
pub use dispatcher::Dispatcher;
pub use external::{ProcessFleetManager, ProcessLogSink};
pub use fleet::{FleetManager, LogSink};
pub use poller::{CancellationHandle, StatusPoller};
pub use types::{DispatchRequest, DispatchResult, ExecutionStatus};
