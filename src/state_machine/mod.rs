mod job;
mod lifecycle;

pub use job::{ActiveJob, CompletedJob, Job, Location, PaymentMethod, Stage, Totals};
pub use lifecycle::{LifecycleManager, LifecycleState, SharedManager};
