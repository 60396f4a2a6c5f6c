#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Duplicate { name: String, topic: String },
    NotFound(String),
    MissingName,
    InvalidTopic(String),
    InvalidRule(Vec<String>),
    NoActions,
    Unavailable(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate { name, topic } => {
                write!(f, "rule '{name}' already exists for topic '{topic}'")
            }
            Self::NotFound(id) => write!(f, "rule '{id}' not found"),
            Self::MissingName => write!(f, "rule name must not be empty"),
            Self::InvalidTopic(topic) => write!(f, "invalid topic '{topic}'"),
            Self::InvalidRule(problems) => write!(f, "invalid rule: {}", problems.join("; ")),
            Self::NoActions => write!(f, "rule must define at least one action"),
            Self::Unavailable(reason) => write!(f, "rule source unavailable: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}
