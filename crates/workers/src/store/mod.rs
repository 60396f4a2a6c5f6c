mod error;
mod rule_store;
mod rules_file;
mod source;

pub use error::ConfigError;
pub use rule_store::{RuleChange, RuleStore};
pub use rules_file::{load_rules_file, parse_rules, RulesFileError};
pub use source::RuleSource;
