//! Job supervision.
//!
//! The [`Supervisor`] runs scans and updates on background tasks and hands
//! back a [`JobHandle`] through which the caller receives events and can
//! cancel the job.

mod handle;
mod supervisor;

pub use handle::JobHandle;
pub use supervisor::Supervisor;
