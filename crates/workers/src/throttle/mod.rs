mod registry;
mod window;

pub use registry::{ThrottleKey, ThrottleRegistry, ThrottleSettings};
pub use window::FixedWindow;
