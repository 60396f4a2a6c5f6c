use colored::{ColoredString, Colorize};

const LABEL_WIDTH: usize = 16;

pub fn mark(ok: bool) -> ColoredString {
    if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    }
}

pub fn report(ok: bool, msg: &str) {
    if ok {
        println!("{} {msg}", mark(true));
    } else {
        eprintln!("{} {msg}", mark(false));
    }
}

pub fn heading(title: &str) {
    println!();
    println!("{} {}", "▸".yellow().bold(), title.to_uppercase().bold());
    println!("{}", "═".repeat(title.chars().count() + 2).yellow());
}

pub fn field(label: &str, value: &str) {
    println!("  {} {value}", label_cell(label));
}

pub fn field_status(label: &str, ok: bool, yes: &str, no: &str) {
    let value = if ok { yes.green() } else { no.red() };
    println!("  {} {value}", label_cell(label));
}

pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

fn label_cell(label: &str) -> ColoredString {
    format!("{:<width$}", format!("{label}:"), width = LABEL_WIDTH).dimmed()
}
