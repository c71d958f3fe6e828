//! Stack text parsing.
//!
//! Handles two textual shapes: Rust backtraces (`"<n>: <symbol>"` headers
//! followed by `at <file>:<line>` location lines) and line-per-frame traces
//! such as those printed by JavaScript engines.

use regex::Regex;
use std::sync::LazyLock;

const CRATE: &str = env!("CARGO_CRATE_NAME");

/// Modules of this crate that sit between a slice action and the inferencer.
const PLUMBING: &[&str] = &["compose::mutator", "core::state", "store", "devtools", "infer"];

const STD_PREFIXES: &[&str] = &["std::", "core::", "alloc::", "__rust", "rust_begin_unwind"];

struct FramePatterns {
    rust_header: Regex,
    rust_location: Regex,
    rust_hash: Regex,
    rust_name: Regex,
    // Tried in order, first match wins.
    line_names: [Regex; 5],
}

impl FramePatterns {
    fn new() -> Self {
        Self {
            rust_header: Regex::new(r"^\s*\d+:\s+(.+?)\s*$").expect("valid frame header regex"),
            rust_location: Regex::new(r"^\s*at\s+.+:\d+(?::\d+)?\s*$")
                .expect("valid frame location regex"),
            rust_hash: Regex::new(r"::h[0-9a-f]{16}$").expect("valid symbol hash regex"),
            rust_name: Regex::new(r"^(?:.*::)?(\w+)(?:::<.*>)?$").expect("valid symbol name regex"),
            line_names: [
                Regex::new(r"at\s+(\w+)\s+").expect("valid `at name` regex"),
                Regex::new(r"(\w+)@").expect("valid `name@` regex"),
                Regex::new(r"at\s+Object\.(\w+)\s*\(").expect("valid `at Object.name(` regex"),
                Regex::new(r"\.(\w+)\s*\(").expect("valid `.name(` regex"),
                Regex::new(r"(\w+)\s*\(").expect("valid `name(` regex"),
            ],
        }
    }
}

static PATTERNS: LazyLock<FramePatterns> = LazyLock::new(FramePatterns::new);

/// One frame of a captured stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame<'a> {
    /// A Rust backtrace frame, holding the demangled symbol
    Symbol(&'a str),
    /// A whole line of a line-per-frame trace
    Line(&'a str),
}

impl<'a> Frame<'a> {
    fn text(&self) -> &'a str {
        match self {
            Frame::Symbol(text) | Frame::Line(text) => *text,
        }
    }

    /// Frames that never name the caller: closures, standard library shims,
    /// unresolved symbols and this crate's own mutation plumbing.
    fn is_transparent(&self) -> bool {
        let Frame::Symbol(symbol) = self else {
            return false;
        };
        let path = symbol.trim_start_matches('<');
        symbol.contains("{{closure}}")
            || symbol.contains(" as core::ops::function::")
            || symbol.starts_with("<unknown>")
            || STD_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
            || PLUMBING.iter().any(|module| is_within(path, module))
    }

    fn name(&self) -> Option<String> {
        let patterns = &*PATTERNS;
        match self {
            Frame::Symbol(symbol) => {
                let symbol = patterns.rust_hash.replace(symbol, "");
                patterns
                    .rust_name
                    .captures(&symbol)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
            }
            Frame::Line(line) => patterns
                .line_names
                .iter()
                .find_map(|pattern| pattern.captures(line))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
        }
    }
}

fn is_within(path: &str, module: &str) -> bool {
    path.strip_prefix(CRATE)
        .and_then(|rest| rest.strip_prefix("::"))
        .and_then(|rest| rest.strip_prefix(module))
        .is_some_and(|rest| rest.starts_with("::") || rest.starts_with('<'))
}

/// Split stack text into frames.
///
/// # Example
///
/// ```rust
/// use slicestate::infer::{frames, Frame};
///
/// let text = "   0: app::bump\n             at ./src/main.rs:3:5\n   1: app::main";
/// assert_eq!(frames(text), vec![Frame::Symbol("app::bump"), Frame::Symbol("app::main")]);
/// ```
pub fn frames(text: &str) -> Vec<Frame<'_>> {
    let patterns = &*PATTERNS;
    let mut frames = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(symbol) = patterns.rust_header.captures(line).and_then(|c| c.get(1)) {
            frames.push(Frame::Symbol(symbol.as_str()));
            continue;
        }
        let follows_symbol = matches!(frames.last(), Some(Frame::Symbol(_)));
        if follows_symbol && patterns.rust_location.is_match(line) {
            continue;
        }
        frames.push(Frame::Line(line));
    }
    frames
}

/// Recover the caller's name from stack text.
///
/// Finds the first frame mentioning `marker`, skips it and the frame right
/// above it (the mutator), skips transparent Rust frames, and reads the name
/// of the next frame. Returns `None` rather than guessing.
///
/// # Example
///
/// ```rust
/// use slicestate::infer::caller_name_from_stack;
///
/// let chrome = "Error\n    at extractName (store.js:4:9)\n    at apply (store.js:12:3)\n    at addBear (bear.js:7:5)";
/// assert_eq!(caller_name_from_stack(chrome, "extractName").as_deref(), Some("addBear"));
///
/// assert_eq!(caller_name_from_stack("no frames here", "extractName"), None);
/// ```
pub fn caller_name_from_stack(text: &str, marker: &str) -> Option<String> {
    let frames = frames(text);
    let position = frames.iter().position(|f| f.text().contains(marker))?;
    frames
        .iter()
        .skip(position + 2)
        .find(|f| !f.is_transparent())
        .and_then(Frame::name)
}
