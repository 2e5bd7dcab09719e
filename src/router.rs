//! Command routing: raw message text to command name and argument text

/// A message recognised as a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// Command token after the prefix
    pub name: &'a str,
    /// Everything after the first whitespace run, untouched
    pub remainder: &'a str,
}

/// Split `raw` into command name and remainder, or `None` if it is not a
/// command (missing prefix, or nothing after it).
pub fn parse<'a>(raw: &'a str, prefix: &str) -> Option<ParsedCommand<'a>> {
    let body = raw.trim().strip_prefix(prefix)?;
    let (name, remainder) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim_start()),
        None => (body, ""),
    };

    if name.is_empty() {
        return None;
    }
    Some(ParsedCommand { name, remainder })
}
