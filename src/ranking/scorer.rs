//! Relevance scoring of a single import line against a keyword
//!
//! Higher is more relevant. The weights order matches as follows:
//! - exact module-path matches outrank exact symbol matches
//! - a single named import outranks the same name inside a larger group
//! - bare substring containment beats a non-match, and nothing else

use once_cell::sync::Lazy;
use regex::Regex;

static MODULE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bfrom\s*['"`]([^'"`]*)['"`]"#).expect("valid module path regex"));

/// `import './styles.css'`: a module path with nothing imported
static SIDE_EFFECT_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*import\s*['"`]([^'"`]*)['"`]"#).expect("valid side-effect import regex")
});

static SYMBOLS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*import\s+(?:type\s+)?(\{[^}]*\}?|\*\s*as\s+[A-Za-z0-9_$]+|[A-Za-z0-9_$]+)")
        .expect("valid symbols regex")
});

const PATH_CONTAINS: u32 = 100;
const PATH_EXACT: u32 = 50;
const PATH_SEGMENT_PREFIX: u32 = 30;
const SYMBOLS_CONTAINS: u32 = 80;
const SINGLE_NAMED_EXACT: u32 = 60;
const NAMED_EXACT: u32 = 40;
const NAMED_PREFIX: u32 = 20;
const BARE_EXACT: u32 = 60;
const BARE_CONTAINS: u32 = 40;
const LINE_CONTAINS: u32 = 10;

/// Imported-symbols segment of an import line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbols<'a> {
    /// Contents of a `{ ... }` group, braces stripped
    Named(&'a str),
    /// Default or namespace import (`React`, `* as path`)
    Bare(&'a str),
}

/// The two segments of an import line the scorer looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportAnatomy<'a> {
    pub module_path: Option<&'a str>,
    pub symbols: Option<Symbols<'a>>,
}

impl<'a> ImportAnatomy<'a> {
    /// Split a candidate line into module path and symbols segments.
    /// Either segment may be missing; the line is never rejected.
    pub fn parse(line: &'a str) -> Self {
        let module_path = MODULE_PATH
            .captures(line)
            .or_else(|| SIDE_EFFECT_PATH.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str());

        let symbols = SYMBOLS
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| {
                let segment = m.as_str();
                match segment.strip_prefix('{') {
                    Some(inner) => Symbols::Named(inner.strip_suffix('}').unwrap_or(inner)),
                    None => Symbols::Bare(segment),
                }
            });

        Self {
            module_path,
            symbols,
        }
    }

    /// True when the module path is `./...` or `../...`
    pub fn is_relative(&self) -> bool {
        self.module_path
            .map(|path| path.starts_with("./") || path.starts_with("../"))
            .unwrap_or(false)
    }
}

/// True when `line` imports from a relative module path
pub fn is_relative_import(line: &str) -> bool {
    ImportAnatomy::parse(line).is_relative()
}

/// Score `line` against `keyword`. Pure and deterministic; an empty
/// keyword scores every line 0.
pub fn score(line: &str, keyword: &str) -> u32 {
    if keyword.is_empty() {
        return 0;
    }

    let anatomy = ImportAnatomy::parse(line);
    let mut total = 0;

    if let Some(path) = anatomy.module_path {
        total += score_module_path(path, keyword);
    }

    if let Some(symbols) = anatomy.symbols {
        total += score_symbols(symbols, keyword);
    }

    if total == 0 && line.contains(keyword) {
        total = LINE_CONTAINS;
    }

    total
}

fn score_module_path(path: &str, keyword: &str) -> u32 {
    if !path.contains(keyword) {
        return 0;
    }

    let mut total = PATH_CONTAINS;
    if path == keyword {
        total += PATH_EXACT;
    }
    let prefixed = path
        .split('/')
        .filter(|segment| segment.starts_with(keyword))
        .count() as u32;
    total + prefixed * PATH_SEGMENT_PREFIX
}

fn score_symbols(symbols: Symbols<'_>, keyword: &str) -> u32 {
    match symbols {
        Symbols::Named(group) => {
            if !group.contains(keyword) {
                return 0;
            }
            let names: Vec<&str> = group
                .split(',')
                .map(imported_name)
                .filter(|name| !name.is_empty())
                .collect();

            let mut total = SYMBOLS_CONTAINS;
            if names.len() == 1 && names[0] == keyword {
                return total + SINGLE_NAMED_EXACT;
            }
            for name in names {
                if name == keyword {
                    total += NAMED_EXACT;
                } else if name.starts_with(keyword) {
                    total += NAMED_PREFIX;
                }
            }
            total
        }
        Symbols::Bare(segment) => {
            if !segment.contains(keyword) {
                0
            } else if segment == keyword {
                SYMBOLS_CONTAINS + BARE_EXACT
            } else {
                SYMBOLS_CONTAINS + BARE_CONTAINS
            }
        }
    }
}

/// `type Foo as Bar` -> `Foo`
fn imported_name(entry: &str) -> &str {
    let entry = entry.trim();
    let entry = entry.strip_prefix("type ").map(str::trim_start).unwrap_or(entry);
    entry.split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_import() {
        let anatomy = ImportAnatomy::parse("import { Foo, Bar } from '@lib/foo';");
        assert_eq!(anatomy.module_path, Some("@lib/foo"));
        assert_eq!(anatomy.symbols, Some(Symbols::Named(" Foo, Bar ")));
    }

    #[test]
    fn test_parse_type_and_namespace_imports() {
        let anatomy = ImportAnatomy::parse("import type { Props } from \"./props\"");
        assert_eq!(anatomy.symbols, Some(Symbols::Named(" Props ")));
        assert!(anatomy.is_relative());

        let anatomy = ImportAnatomy::parse("import * as path from 'path'");
        assert_eq!(anatomy.symbols, Some(Symbols::Bare("* as path")));
        assert_eq!(anatomy.module_path, Some("path"));
    }

    #[test]
    fn test_relative_detection() {
        assert!(is_relative_import("import a from './a'"));
        assert!(is_relative_import("import { b } from \"../b/c\""));
        assert!(!is_relative_import("import c from 'c'"));
        assert!(!is_relative_import("const x = 1;"));
    }

    #[test]
    fn test_side_effect_import_path() {
        let anatomy = ImportAnatomy::parse("import './Foo.css';");
        assert_eq!(anatomy.module_path, Some("./Foo.css"));
        assert_eq!(anatomy.symbols, None);
        assert!(anatomy.is_relative());

        assert!(is_relative_import("import\"../polyfill\""));
        assert!(!is_relative_import("import 'reflect-metadata';"));
        assert_eq!(
            ImportAnatomy::parse("import 'reflect-metadata';").module_path,
            Some("reflect-metadata")
        );
    }

    #[test]
    fn test_single_named_beats_group() {
        let single = score("import { Foo } from '@lib/foo'", "Foo");
        let group = score("import { Foo, Bar } from '@lib/foo'", "Foo");
        assert!(single > group, "single={} group={}", single, group);
    }

    #[test]
    fn test_exact_module_path_beats_exact_symbol() {
        let path_match = score("import x from 'lodash'", "lodash");
        let symbol_match = score("import { lodash } from 'utils'", "lodash");
        assert!(path_match > symbol_match);
    }

    #[test]
    fn test_path_segment_prefix_bonus() {
        let nested = score("import a from 'react/react-dom'", "react");
        let flat = score("import a from 'preact'", "react");
        assert!(nested > flat);
        // contains + two prefixed segments
        assert_eq!(nested, PATH_CONTAINS + 2 * PATH_SEGMENT_PREFIX);
    }

    #[test]
    fn test_named_prefix_and_alias() {
        let s = score("import { useState, useStateLike } from 'x'", "useState");
        assert_eq!(s, SYMBOLS_CONTAINS + NAMED_EXACT + NAMED_PREFIX);

        let aliased = score("import { Foo as F } from 'x'", "Foo");
        assert_eq!(aliased, SYMBOLS_CONTAINS + SINGLE_NAMED_EXACT);
    }

    #[test]
    fn test_bare_import_scores() {
        assert_eq!(score("import React from 'x'", "React"), SYMBOLS_CONTAINS + BARE_EXACT);
        assert_eq!(score("import ReactDOM from 'x'", "React"), SYMBOLS_CONTAINS + BARE_CONTAINS);
    }

    #[test]
    fn test_substring_fallback_and_non_match() {
        assert_eq!(score("export { Foo } from 'bar'", "Foo"), LINE_CONTAINS);
        assert_eq!(score("import { Bar } from 'baz'", "Foo"), 0);
        assert_eq!(score("import { Bar } from 'baz'", ""), 0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let line = "import { Foo, FooBar } from '@lib/foo/FooBar'";
        let first = score(line, "Foo");
        for _ in 0..10 {
            assert_eq!(score(line, "Foo"), first);
        }
    }
}
