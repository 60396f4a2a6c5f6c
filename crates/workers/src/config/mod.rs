mod loader;
mod schema;

pub use loader::{apply_env_overrides, load_from_file, load_from_str, LoadError};
pub use schema::{NotifierConfig, ReconcileConfig, ThrottleConfig, WorkerConfig};
