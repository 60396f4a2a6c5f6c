use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::{mark, OutputMode};

const TICKS: &[&str] = &["◐", "◓", "◑", "◒", " "];

pub fn create(msg: &str) -> ProgressBar {
    let sp = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.yellow} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS);
    sp.set_style(style);
    sp.set_message(msg.to_string());
    sp.enable_steady_tick(Duration::from_millis(100));
    sp
}

pub async fn while_running<T, F>(mode: OutputMode, msg: &str, work: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    let sp = mode.is_human().then(|| create(msg));
    let result = work.await;
    if let Some(sp) = sp {
        sp.finish_and_clear();
    }
    result
}

pub async fn with_outcome<T, F>(mode: OutputMode, msg: &str, done: &str, work: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    let sp = mode.is_human().then(|| create(msg));
    let result = work.await;
    if let Some(sp) = sp {
        if let Ok(style) = ProgressStyle::with_template("{msg}") {
            sp.set_style(style);
        }
        let ok = result.is_ok();
        let line = if ok { done.to_string() } else { format!("{msg} failed") };
        sp.finish_with_message(format!("{} {line}", mark(ok)));
    }
    result
}
