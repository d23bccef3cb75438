//! Filter and test names referenced by a template source.
//!
//! MiniJinja resolves filters and tests only when the instruction runs, so a
//! misspelled filter inside a branch that never executes would go unnoticed.
//! The scanner here walks every directive of the source, executed or not,
//! and reports the names used after `|`, after `is`/`is not`, and in
//! `filter` blocks.

use crate::config::Delimiters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Filter,
    Test,
}

/// A filter or test name used by a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'s> {
    pub kind: ReferenceKind,
    pub name: &'s str,
    /// 1-based line of the name in the source.
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Block,
    Variable,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'s> {
    Ident(&'s str, usize),
    Punct(char),
}

fn line_at(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

/// Finds the next directive start at or after `pos`.
fn next_tag(source: &str, pos: usize, delimiters: &Delimiters) -> Option<(usize, Tag)> {
    let rest = &source[pos..];
    [
        (delimiters.block_start.as_str(), Tag::Block),
        (delimiters.variable_start.as_str(), Tag::Variable),
        (delimiters.comment_start.as_str(), Tag::Comment),
    ]
    .into_iter()
    .filter_map(|(marker, tag)| rest.find(marker).map(|i| (pos + i, tag)))
    .min_by_key(|(offset, _)| *offset)
}

/// Returns the offset just past a string literal starting at `start`.
fn skip_string(source: &str, start: usize, quote: char) -> usize {
    let mut escaped = false;
    for (i, c) in source[start + quote.len_utf8()..].char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            c if c == quote => return start + quote.len_utf8() + i + c.len_utf8(),
            _ => {}
        }
    }
    source.len()
}

/// Tokenizes a directive body up to `close` outside brackets and strings.
///
/// Returns the tokens and the offset just past the closing marker.
fn tokenize<'s>(source: &'s str, from: usize, close: &str) -> (Vec<Token<'s>>, usize) {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut i = from;

    while let Some(c) = source[i..].chars().next() {
        if depth == 0 && source[i..].starts_with(close) {
            return (tokens, i + close.len());
        }
        match c {
            '\'' | '"' => {
                i = skip_string(source, i, c);
                tokens.push(Token::Punct(c));
                continue;
            }
            c if c.is_alphanumeric() || c == '_' => {
                let len = source[i..]
                    .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
                    .unwrap_or(source.len() - i);
                if !c.is_ascii_digit() {
                    tokens.push(Token::Ident(&source[i..i + len], i));
                }
                i += len;
                continue;
            }
            '(' | '[' | '{' => {
                depth += 1;
                tokens.push(Token::Punct(c));
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                tokens.push(Token::Punct(c));
            }
            c if c.is_whitespace() => {}
            _ => tokens.push(Token::Punct(c)),
        }
        i += c.len_utf8();
    }
    (tokens, source.len())
}

fn first_ident<'s>(tokens: &[Token<'s>]) -> Option<&'s str> {
    tokens.iter().find_map(|token| match token {
        Token::Ident(name, _) => Some(*name),
        Token::Punct(_) => None,
    })
}

fn extract<'s>(source: &str, tokens: &[Token<'s>], is_block: bool, out: &mut Vec<Reference<'s>>) {
    let mut push = |kind, token: Option<&Token<'s>>| {
        if let Some(Token::Ident(name, offset)) = token {
            out.push(Reference { kind, name: *name, line: line_at(source, *offset) });
        }
    };

    if is_block && first_ident(tokens) == Some("filter") {
        let position = tokens.iter().position(|t| matches!(t, Token::Ident("filter", _)));
        if let Some(position) = position {
            push(ReferenceKind::Filter, tokens.get(position + 1));
        }
    }

    for (idx, token) in tokens.iter().enumerate() {
        match token {
            Token::Punct('|') => push(ReferenceKind::Filter, tokens.get(idx + 1)),
            Token::Ident("is", _) if idx == 0 || tokens[idx - 1] != Token::Punct('.') => {
                let next = match tokens.get(idx + 1) {
                    Some(Token::Ident("not", _)) => tokens.get(idx + 2),
                    other => other,
                };
                push(ReferenceKind::Test, next);
            }
            _ => {}
        }
    }
}

/// Collects every filter and test name used in `source`.
///
/// Text inside comments and `raw` blocks is ignored. Malformed directives
/// are scanned as far as they go; the template engine reports their errors.
pub fn collect_references<'s>(source: &'s str, delimiters: &Delimiters) -> Vec<Reference<'s>> {
    let mut references = Vec::new();
    let mut pos = 0;
    let mut in_raw = false;

    while pos < source.len() {
        let next = if in_raw {
            source[pos..].find(delimiters.block_start.as_str()).map(|i| (pos + i, Tag::Block))
        } else {
            next_tag(source, pos, delimiters)
        };
        let Some((start, tag)) = next else {
            break;
        };

        let (open, close) = match tag {
            Tag::Comment => {
                let body = start + delimiters.comment_start.len();
                pos = source[body..]
                    .find(delimiters.comment_end.as_str())
                    .map_or(source.len(), |i| body + i + delimiters.comment_end.len());
                continue;
            }
            Tag::Block => (&delimiters.block_start, &delimiters.block_end),
            Tag::Variable => (&delimiters.variable_start, &delimiters.variable_end),
        };

        let (tokens, end) = tokenize(source, start + open.len(), close);
        pos = end;

        let keyword = if tag == Tag::Block { first_ident(&tokens) } else { None };
        if in_raw {
            in_raw = keyword != Some("endraw");
            continue;
        }
        if keyword == Some("raw") {
            in_raw = true;
            continue;
        }
        extract(source, &tokens, tag == Tag::Block, &mut references);
    }
    references
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(source: &str) -> Vec<(ReferenceKind, &str, usize)> {
        collect_references(source, &Delimiters::default())
            .into_iter()
            .map(|r| (r.kind, r.name, r.line))
            .collect()
    }

    #[test]
    fn test_filters_in_variables_and_blocks() {
        assert_eq!(
            names("@(x|typeify)\n@[for f in data.fields|sort]@(f|constify|lower)@[endfor]"),
            vec![
                (ReferenceKind::Filter, "typeify", 1),
                (ReferenceKind::Filter, "sort", 2),
                (ReferenceKind::Filter, "constify", 2),
                (ReferenceKind::Filter, "lower", 2),
            ]
        );
    }

    #[test]
    fn test_dead_branches_are_scanned() {
        assert_eq!(
            names("@[if false]@(x|nosuch)@[endif]ok\n"),
            vec![(ReferenceKind::Filter, "nosuch", 1)]
        );
    }

    #[test]
    fn test_tests_after_is() {
        assert_eq!(
            names("@[if x is defined and y is not odd]@[endif]"),
            vec![(ReferenceKind::Test, "defined", 1), (ReferenceKind::Test, "odd", 1)]
        );
        assert!(names("@(data.is)").is_empty());
    }

    #[test]
    fn test_filter_block() {
        assert_eq!(
            names("@[filter upper|trim]x@[endfilter]"),
            vec![(ReferenceKind::Filter, "upper", 1), (ReferenceKind::Filter, "trim", 1)]
        );
    }

    #[test]
    fn test_strings_comments_and_raw_are_skipped() {
        assert!(names("@('a|b' ~ \"c|d\")").is_empty());
        assert!(names("@# @(x|nosuch) #text").is_empty());
        assert_eq!(
            names("@[raw]@(x|nosuch)@[endraw]@(y|upper)"),
            vec![(ReferenceKind::Filter, "upper", 1)]
        );
    }

    #[test]
    fn test_nested_brackets_do_not_end_directive() {
        assert_eq!(
            names("@(range(3)|join(','))\n@[set x = data['a]']|length]"),
            vec![(ReferenceKind::Filter, "join", 1), (ReferenceKind::Filter, "length", 2)]
        );
    }
}
