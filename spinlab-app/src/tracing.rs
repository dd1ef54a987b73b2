// Re-export `tracing` crate under own name to not collide and as convenient import
pub use tracing::{self, Level as TraceLevel, event as trace};
