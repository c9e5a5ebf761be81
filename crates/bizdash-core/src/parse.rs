//! Parsers for the multi-line free-text fields the forms collect.
//!
//! None of these fail: text that does not fit a pattern is kept in the
//! loosest shape available so nothing the user typed disappears.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:[-*+•]|\d+[.)])\s+").expect("valid regex"))
}

fn scorecard_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<metric>[^:]+?)\s*:\s*(?P<actual>[^/]+?)\s*/\s*(?P<goal>.+?)\s*$")
            .expect("valid regex")
    })
}

fn checkbox_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[(?P<mark>[ xX✓]?)\]\s*(?P<rest>.*)$").expect("valid regex"))
}

fn owner_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:\((?P<paren>[^()]+)\)|(?:^|\s)@(?P<at>[\w.-]+))\s*$")
            .expect("valid regex")
    })
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

fn strip_bullet(line: &str) -> &str {
    match bullet_re().find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

/// One item per non-blank line, list markers removed.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_bullet)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Names separated by commas, semicolons or newlines. Duplicates (ignoring
/// case) are dropped, first spelling wins.
pub fn parse_attendees(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in text.split([',', ';', '\n']).map(str::trim) {
        if name.is_empty() {
            continue;
        }
        if !out.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            out.push(name.to_string());
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Money / numbers
// ---------------------------------------------------------------------------

/// `$1,200`, `1.2k`, `$3M`, `250000`, `45%` → number. `None` if unparsable.
pub fn parse_money(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let lower = cleaned.to_ascii_lowercase();
    let (digits, factor) = if let Some(d) = lower.strip_suffix("mm") {
        (d, 1_000_000.0)
    } else if let Some(d) = lower.strip_suffix('k') {
        (d, 1_000.0)
    } else if let Some(d) = lower.strip_suffix('m') {
        (d, 1_000_000.0)
    } else if let Some(d) = lower.strip_suffix('b') {
        (d, 1_000_000_000.0)
    } else {
        (lower.as_str(), 1.0)
    };
    let value = digits.parse::<f64>().ok()? * factor;
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// Scorecard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardEntry {
    pub metric: String,
    pub actual: Option<f64>,
    pub goal: Option<f64>,
    /// `None` when either number is missing.
    pub on_track: Option<bool>,
}

/// `Metric: actual / goal`, one per line.
pub fn parse_scorecard(text: &str) -> Vec<ScorecardEntry> {
    parse_lines(text)
        .into_iter()
        .map(|line| match scorecard_re().captures(&line) {
            Some(caps) => {
                let actual = parse_money(&caps["actual"]);
                let goal = parse_money(&caps["goal"]);
                let on_track = match (actual, goal) {
                    (Some(a), Some(g)) => Some(a >= g),
                    _ => None,
                };
                ScorecardEntry {
                    metric: caps["metric"].trim().to_string(),
                    actual,
                    goal,
                    on_track,
                }
            }
            None => ScorecardEntry {
                metric: line.trim_end_matches(':').trim().to_string(),
                actual: None,
                goal: None,
                on_track: None,
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// To-dos
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub text: String,
    pub owner: Option<String>,
    pub done: bool,
}

/// `[x] text (Owner)`, `[ ] text @owner`, or a plain line (not done).
pub fn parse_todos(text: &str) -> Vec<TodoItem> {
    parse_lines(text)
        .into_iter()
        .map(|line| {
            let (done, rest) = match checkbox_re().captures(&line) {
                Some(caps) => (
                    matches!(&caps["mark"], "x" | "X" | "✓"),
                    caps["rest"].to_string(),
                ),
                None => (false, line.clone()),
            };
            let (text, owner) = match owner_re().captures(&rest) {
                Some(caps) => {
                    let owner = caps
                        .name("paren")
                        .or_else(|| caps.name("at"))
                        .map(|m| m.as_str().trim().to_string());
                    let start = caps.get(0).map(|m| m.start()).unwrap_or(rest.len());
                    (rest[..start].trim().to_string(), owner)
                }
                None => (rest.trim().to_string(), None),
            };
            // A line that was nothing but an owner keeps the owner as text.
            if text.is_empty() {
                return TodoItem {
                    text: rest.trim().to_string(),
                    owner: None,
                    done,
                };
            }
            TodoItem { text, owner, done }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Objection handling
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectionResponse {
    pub objection: String,
    pub response: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Filling {
    Objection,
    Response,
}

fn strip_prefix_ci<'a>(line: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|p| {
        let head = line.get(..p.len())?;
        head.eq_ignore_ascii_case(p).then(|| line[p.len()..].trim())
    })
}

fn append(field: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !field.is_empty() {
        field.push(' ');
    }
    field.push_str(text);
}

/// `Objection:` / `Response:` (or `Q:` / `A:`) pairs. Unprefixed lines
/// continue whichever half is being filled; a blank line ends the pair.
pub fn parse_objections(text: &str) -> Vec<ObjectionResponse> {
    let mut out = Vec::new();
    let mut current: Option<(ObjectionResponse, Filling)> = None;

    for raw in text.lines() {
        let line = strip_bullet(raw);
        if line.is_empty() {
            if let Some((pair, _)) = current.take() {
                out.push(pair);
            }
            continue;
        }
        if let Some(rest) = strip_prefix_ci(line, &["objection:", "q:"]) {
            if let Some((pair, _)) = current.take() {
                out.push(pair);
            }
            current = Some((
                ObjectionResponse {
                    objection: rest.to_string(),
                    response: String::new(),
                },
                Filling::Objection,
            ));
            continue;
        }
        if let Some(rest) = strip_prefix_ci(line, &["response:", "a:"]) {
            let (pair, filling) =
                current.get_or_insert_with(|| (ObjectionResponse::default(), Filling::Response));
            append(&mut pair.response, rest);
            *filling = Filling::Response;
            continue;
        }
        match current.as_mut() {
            Some((pair, Filling::Objection)) => append(&mut pair.objection, line),
            Some((pair, Filling::Response)) => append(&mut pair.response, line),
            None => {
                current = Some((
                    ObjectionResponse {
                        objection: line.to_string(),
                        response: String::new(),
                    },
                    Filling::Objection,
                ))
            }
        }
    }
    if let Some((pair, _)) = current {
        out.push(pair);
    }
    out
}
