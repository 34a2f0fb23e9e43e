#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Presentation helpers for the small appliance display.
//!
//! The core hands the display pre-wrapped lines; the wrapping and the
//! textual progress bar used by the console backend live here.

/// Greedy word wrap to at most `width` columns per line. Words longer than
/// `width` are hard-split so a single token can never overflow a line.
/// `width` is clamped to at least 1.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut rest = word;
        while rest.chars().count() > width {
            // Hard-split an oversized token, flushing the current line first.
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let split = rest
                .char_indices()
                .nth(width)
                .map_or(rest.len(), |(i, _)| i);
            lines.push(rest[..split].to_string());
            rest = &rest[split..];
        }
        if rest.is_empty() {
            continue;
        }
        let needed = rest.chars().count() + if line.is_empty() { 0 } else { 1 };
        if line.chars().count() + needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(rest);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Render a textual progress bar, e.g. `[#####.....]  50%`.
/// `percent` is clamped to 100; `cols` is the width of the bar interior.
pub fn progress_line(percent: u8, cols: usize) -> String {
    let percent = percent.min(100) as usize;
    let cols = cols.max(1);
    let filled = percent * cols / 100;
    let mut out = String::with_capacity(cols + 8);
    out.push('[');
    for i in 0..cols {
        out.push(if i < filled { '#' } else { '.' });
    }
    out.push(']');
    out.push_str(&format!(" {percent:>3}%"));
    out
}
