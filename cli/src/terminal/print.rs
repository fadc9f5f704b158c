use crate::terminal::{banner, colors};
use colored::*;
use tracing::info;
use unicode_width::UnicodeWidthStr;

pub const TOTAL_WIDTH: usize = 64;
const KEY_WIDTH: usize = 12;

/// Target the log formatter prints verbatim, without a level symbol.
pub const PRINT_TARGET: &str = "sweepr::print";

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

/// Routed through tracing so output never tears the progress spinner.
pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn banner(no_banner: bool, q_level: u8) {
    if no_banner || q_level > 0 {
        return;
    }

    let text_content: String = format!("⟦ SWEEPR v{} ⟧ ", env!("CARGO_PKG_VERSION"));
    let text_width: usize = UnicodeWidthStr::width(text_content.as_str());
    let text: ColoredString = text_content.bright_green().bold();
    let sep: ColoredString = "═"
        .repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2)
        .bright_black();

    print(&format!("{sep}{text}{sep}"));
    banner::print();
}

/// `───⟦ TITLE ⟧───` spanning [`TOTAL_WIDTH`].
pub fn header(title: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let title: String = format!("⟦ {} ⟧", title.to_uppercase());
    let fill: usize = TOTAL_WIDTH.saturating_sub(title.chars().count());
    let (left, right) = (fill / 2, fill - fill / 2);

    print(&format!(
        "{}{}{}",
        "─".repeat(left).color(colors::SEPARATOR),
        title.bright_green(),
        "─".repeat(right).color(colors::SEPARATOR)
    ));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{sep}"));
}

/// `> Key.......: value`, keys padded to a common width.
pub fn aligned_line(key: &str, value: ColoredString) {
    let dots: String = ".".repeat(KEY_WIDTH.saturating_sub(key.len()));
    print(&format!(
        "{} {}{}{} {}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        dots.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value
    ));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{space}{msg}{space}"));
}

const NO_RESULTS: &str = r#"
         _   _  ___     ___  ____  _____ _   _
        | \ | |/ _ \   / _ \|  _ \| ____| \ | |
        |  \| | | | | | | | | |_) |  _| |  \| |
        | |\  | |_| | | |_| |  __/| |___| |\  |
        |_| \_|\___/   \___/|_|   |_____|_| \_|
"#;

pub fn no_results() {
    print(&format!("{}", NO_RESULTS.red().bold()));
}

pub fn end_of_program() {
    print(&format!(
        "{}",
        "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)
    ));
}
