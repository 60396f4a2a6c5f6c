pub mod banner;
mod console;
pub mod prompt;
pub mod spinner;
mod table;

use std::io::Write;

use serde::Serialize;

pub use console::{dim, field, field_status, heading, mark, report};
pub use table::{enabled_cell, new_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Human
        }
    }

    pub fn is_human(self) -> bool {
        self == Self::Human
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn emit<T: Serialize>(mode: OutputMode, value: &T, human: impl FnOnce(&T)) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => print_json(value),
        OutputMode::Human => {
            human(value);
            Ok(())
        }
    }
}
