#![allow(clippy::module_inception)]

use std::{fs, path::PathBuf, rc::Rc};

use crate::errors::errors::{Error, ErrorTip};

pub mod arena;
pub mod ast;
pub mod constraint_system;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod name_lookup;
pub mod parser;
pub mod scope;
pub mod type_checker;
pub mod types;

extern crate regex;

/// A byte offset into a named source file.
#[derive(Debug, Clone)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

/// A half-open byte range `[start, end)` of a source file.
#[derive(Debug, Clone)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start.0 <= end.0, "span ends before it starts");
        Span { start, end }
    }

    pub fn contains(&self, loc: u32) -> bool {
        self.start.0 <= loc && loc < self.end.0
    }

    pub fn contains_span(&self, other: &Span) -> bool {
        self.start.0 <= other.start.0 && other.end.0 <= self.end.0
    }

    /// Two ranges overlap when either one starts inside the other.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.contains(other.start.0) || other.contains(self.start.0)
    }

    pub fn len(&self) -> u32 {
        self.end.0 - self.start.0
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start.0, self.end.0)
    }
}

pub fn get_line_at_position(file: PathBuf, position: u32) -> (usize, String, usize) {
    let content = fs::read_to_string(&file).unwrap_or_default();
    line_at_offset(&content, position)
}

/// Finds the 1-based line number, the line text and the column of `position`.
pub fn line_at_offset(content: &str, position: u32) -> (usize, String, usize) {
    let pos = (position as usize).min(content.len().saturating_sub(1));

    let mut start = 0;
    let mut line_number = 1;

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            let line_pos = pos - start;
            return (line_number, line.to_string(), line_pos);
        }

        start = end;
        line_number += 1;
    }

    (line_number, String::new(), 0)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::{Position, Span};

    #[test]
    fn test_get_line_at_position() {
        let (line_number, line, line_pos) =
            super::get_line_at_position(std::path::PathBuf::from("tests/test_file.txt"), 10);
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) =
            super::get_line_at_position(std::path::PathBuf::from("tests/test_file.txt"), 34);
        assert_eq!(line_number, 4);
        assert_eq!(line, "Testing { }\n");
        assert_eq!(line_pos, 8);
    }

    fn span(start: u32, end: u32) -> Span {
        let file = Rc::new(String::from("test.sora"));
        Span::new(Position(start, Rc::clone(&file)), Position(end, file))
    }

    #[test]
    fn test_span_containment() {
        let outer = span(0, 10);
        assert!(outer.contains(0));
        assert!(outer.contains(9));
        assert!(!outer.contains(10));
        assert!(outer.contains_span(&span(2, 10)));
        assert!(!outer.contains_span(&span(2, 11)));
    }

    #[test]
    fn test_span_overlap() {
        assert!(span(0, 5).overlaps(&span(4, 8)));
        assert!(span(4, 8).overlaps(&span(0, 5)));
        assert!(!span(0, 4).overlaps(&span(4, 8)));
        assert!(span(0, 10).overlaps(&span(3, 4)));
    }
}

pub fn display_error(error: &Error, file: PathBuf) {
    /*
        Error: CannotFindValueInScope (cannot find value `y` in scope)
        -> main.sora
           |
        20 | let a = y
           | --------^
    */

    let content = fs::read_to_string(&file).unwrap_or_default();
    println!("{}", format_error(error, &file.as_os_str().to_string_lossy(), &content));
}

/// Renders an error against the source text it points into.
pub fn format_error(error: &Error, file_name: &str, content: &str) -> String {
    let position = error.get_position();
    let (line, line_text, line_pos) = line_at_offset(content, position.0);

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    let mut out = String::new();
    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        out.push_str(&format!("Error: {} ({})\n", error.get_error_name(), error.get_tip()));
    }
    out.push_str(&format!("-> {}\n", file_name));
    out.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    out.push_str(&format!("{:>padding$} {:->arrows$}", "|", "^"));
    out
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}
