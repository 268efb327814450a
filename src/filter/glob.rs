use regex::Regex;

/// Predicate deciding whether a table name matches an exclusion rule
pub trait NameMatcher: Send + Sync {
    fn matches(&self, name: &str) -> bool;

    /// Human-readable form of the rule, used in logs
    fn source(&self) -> &str;
}

/// Glob pattern compiled to an anchored regular expression
///
/// `*` matches any run of characters (including none), `?` matches exactly
/// one character and `[...]` / `[!...]` are character classes. There are no
/// path-separator semantics and the whole name must match.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    compiled: Compiled,
}

#[derive(Debug, Clone)]
enum Compiled {
    Regex(Regex),
    /// Fallback when the translated class syntax is rejected by the regex engine
    Literal,
}

impl GlobPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        let source = pattern.into();
        let compiled = match Regex::new(&translate(&source)) {
            Ok(regex) => Compiled::Regex(regex),
            Err(_) => Compiled::Literal,
        };
        Self { source, compiled }
    }
}

impl NameMatcher for GlobPattern {
    fn matches(&self, name: &str) -> bool {
        match &self.compiled {
            Compiled::Regex(regex) => regex.is_match(name),
            Compiled::Literal => self.source == name,
        }
    }

    fn source(&self) -> &str {
        &self.source
    }
}

/// Match a single glob against a name
pub fn glob_match(pattern: &str, name: &str) -> bool {
    GlobPattern::new(pattern).matches(name)
}

fn translate(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::from("(?s)^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                // collapse runs of stars
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => {
                out.push('.');
                i += 1;
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i + 1..end]));
                    i = end + 1;
                }
                None => {
                    out.push_str(r"\[");
                    i += 1;
                }
            },
            c => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                i += 1;
            }
        }
    }

    out.push('$');
    out
}

/// Index of the `]` closing the class opened at `open`, if any.
/// A `]` directly after the opening bracket (or its negation) is a member.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if matches!(chars.get(j), Some('!') | Some('^')) {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    chars[j.min(chars.len())..]
        .iter()
        .position(|c| *c == ']')
        .map(|offset| j + offset)
}

fn translate_class(body: &[char]) -> String {
    let mut out = String::from("[");
    let mut members = body;

    if let Some(('!' | '^', rest)) = body.split_first() {
        out.push('^');
        members = rest;
    }

    let last = members.len().saturating_sub(1);
    for (idx, c) in members.iter().enumerate() {
        match c {
            '\\' | '[' | ']' | '^' | '&' | '~' => {
                out.push('\\');
                out.push(*c);
            }
            '-' if idx == 0 || idx == last => out.push_str(r"\-"),
            _ => out.push(*c),
        }
    }

    out.push(']');
    out
}
