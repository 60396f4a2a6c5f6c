use std::path::Path;

use tripwire_common::rule::NewRule;

#[derive(Debug)]
pub enum RulesFileError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for RulesFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
        }
    }
}

impl std::error::Error for RulesFileError {}

impl From<std::io::Error> for RulesFileError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for RulesFileError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

pub fn load_rules_file(path: &Path) -> Result<Vec<NewRule>, RulesFileError> {
    let contents = std::fs::read_to_string(path)?;
    parse_rules(&contents)
}

pub fn parse_rules(yaml: &str) -> Result<Vec<NewRule>, RulesFileError> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_str(yaml)?)
}
