use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;

use super::OutputMode;

pub fn allow_destructive(mode: OutputMode, assume_yes: bool, action: &str) -> bool {
    if assume_yes || !mode.is_human() {
        return true;
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{action}? This cannot be undone"))
        .default(false)
        .interact()
        .unwrap_or(false)
}
