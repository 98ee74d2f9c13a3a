pub mod clock;
pub mod queue_name;
pub mod record;
pub mod toggle;

pub use clock::{Clock, MockClock, SystemClock};
pub use queue_name::QueueName;
pub use record::JobRecord;
pub use toggle::{InterceptionToggle, ToggleScope};
