use anyhow::Context;
use colored::*;
use console::Term;
use sweepr_common::network::target::{self, Target};
use sweepr_common::ports::Selection;

use crate::terminal::colors;

pub fn target() -> anyhow::Result<Target> {
    let answer = ask("Target IP address")?;
    Ok(target::validate(&answer)?)
}

pub fn ports() -> anyhow::Result<Selection> {
    let answer = ask("Ports (e.g. 22,80,8000-8100, top100, all)")?;
    let Ok(selection) = answer.parse::<Selection>();
    Ok(selection)
}

fn ask(question: &str) -> anyhow::Result<String> {
    let term = Term::stdout();
    term.write_str(&format!(
        "{} {}{} ",
        "?".color(colors::ACCENT).bold(),
        question.color(colors::TEXT_DEFAULT),
        ":".color(colors::SEPARATOR)
    ))
    .context("writing prompt")?;
    term.read_line().context("reading answer from stdin")
}
