use console::{Emoji, style};

pub static SUCCESS_ICON: Emoji<'_, '_> = Emoji("✅ ", "");
pub static INFO_ICON: Emoji<'_, '_> = Emoji("ℹ️  ", "");
pub static WARN_ICON: Emoji<'_, '_> = Emoji("⚠️  ", "");
pub static ERROR_ICON: Emoji<'_, '_> = Emoji("❌ ", "");
pub static LANTERN: Emoji<'_, '_> = Emoji("🏮 ", "");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

pub fn print_success(msg: &str) {
    println!("{} {}", SUCCESS_ICON, style(msg).green());
}

pub fn print_info(msg: &str) {
    println!("{} {}", INFO_ICON, style(msg).blue());
}

pub fn print_warn(msg: &str) {
    println!("{} {}", WARN_ICON, style(msg).yellow());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", ERROR_ICON, style(msg).red().bold());
}

pub fn print_step(step: &str) {
    println!("{} {}", SPARKLE, style(step).bold());
}

pub fn print_status(label: &str, msg: &str) {
    println!("  {} {}: {}", LANTERN, style(label).bold().cyan(), msg);
}

pub fn print_banner() {
    let lines: &[&str] = &[
        "  __           _       _ ",
        " / _|_   _  __| | __ _(_)",
        "| |_| | | |/ _` |/ _` | |",
        "|  _| |_| | (_| | (_| | |",
        "|_|  \\__,_|\\__,_|\\__,_|_|",
    ];
    println!();
    for line in lines {
        println!("{}", style(line).red().bold());
    }
    println!("{}", style("Festival AI media gateway.").yellow().italic());
    println!();
}
