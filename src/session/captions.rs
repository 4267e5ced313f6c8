/// Split caption input into per-source lines.
///
/// Lines are separated by `\n` or `\r\n` and trimmed. Trailing blank lines are dropped; interior
/// blank lines stay so that line `i` still pairs with source `i`.
pub fn parse_captions(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).trim().to_owned())
        .collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Whether any parsed line has visible text.
pub fn has_any_caption(lines: &[String]) -> bool {
    lines.iter().any(|l| !l.is_empty())
}

#[cfg(test)]
#[path = "../../tests/unit/session/captions.rs"]
mod tests;
