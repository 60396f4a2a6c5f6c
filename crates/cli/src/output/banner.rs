use colored::Colorize;

const LOGO: &[&str] = &[
    r"  ╔╦╗╦═╗╦╔═╗╦ ╦╦╦═╗╔═╗",
    r"   ║ ╠╦╝║╠═╝║║║║╠╦╝║╣ ",
    r"   ╩ ╩╚═╩╩  ╚╩╝╩╩╚═╚═╝",
];

pub fn print_version_block(version: &str, target: &str, api: &str) {
    for line in LOGO {
        println!("{}", line.bright_cyan().bold());
    }
    println!("  {}", "topic rules → slack".dimmed());
    println!();
    super::field("version", &version.bold().to_string());
    super::field("target", target);
    super::field("default api", api);
    println!();
}
