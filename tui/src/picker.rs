//! Optional fzf delegation
//!
//! When an fzf binary is on PATH and both ends of the terminal are real
//! TTYs, select components render through it: options go in as
//! newline-delimited lines (tab-separated trailing description), the
//! chosen line(s) come back on stdout. Any failure here makes the
//! caller fall back to the built-in renderer silently.

use std::io::{self, IsTerminal, Write};
use std::process::{Command, Stdio};

/// Capability check, evaluated at call time.
pub fn available() -> bool {
    if !(io::stdin().is_terminal() && io::stdout().is_terminal()) {
        return false;
    }
    Command::new("fzf")
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

pub(crate) fn render_option(option: &str, description: Option<&str>) -> String {
    match description.filter(|d| !d.is_empty()) {
        Some(desc) => format!("{}\t{}", option, desc),
        None => option.to_string(),
    }
}

pub(crate) fn match_back(stdout: &str, options: &[String]) -> Vec<usize> {
    stdout
        .lines()
        .filter_map(|line| {
            let name = line.split('\t').next().unwrap_or(line);
            options.iter().position(|o| o == name)
        })
        .collect()
}

/// Run the picker; `Ok(None)` means the user cancelled inside fzf.
pub fn pick(
    prompt: &str,
    options: &[String],
    descriptions: &[String],
    multi: bool,
) -> io::Result<Option<Vec<usize>>> {
    let mut cmd = Command::new("fzf");
    cmd.arg("--prompt")
        .arg(format!("{} > ", prompt))
        .arg("--delimiter")
        .arg("\t")
        .arg("--height")
        .arg("40%")
        .arg("--reverse")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped());
    if multi {
        cmd.arg("--multi");
    }

    let mut child = cmd.spawn()?;
    {
        let stdin = child
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "fzf stdin unavailable"))?;
        for (i, option) in options.iter().enumerate() {
            writeln!(
                stdin,
                "{}",
                render_option(option, descriptions.get(i).map(String::as_str))
            )?;
        }
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        // fzf exits 130 on escape and 1 on no match; both are a cancel
        return Ok(None);
    }

    let picked = match_back(&String::from_utf8_lossy(&output.stdout), options);
    if picked.is_empty() {
        Ok(None)
    } else {
        Ok(Some(picked))
    }
}
