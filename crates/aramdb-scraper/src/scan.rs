//! Depth-counting scanner over Lua table literals.
//!
//! Blocks are delimited by counting `{` and `}`; braces inside quoted
//! strings, long strings (`[[ ... ]]`) and comments (`-- ...`, `--[[ ... ]]`)
//! do not count. All delimiters are ASCII, so scanning bytes is safe on UTF-8
//! input and every returned offset lies on a char boundary.

use std::borrow::Cow;

/// Byte offset of the `}` closing the `{` at `open`, or `None` if the block
/// is never closed.
pub(crate) fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'"' | b'\'' => {
                i = skip_quoted(bytes, i)?;
                continue;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = skip_comment(bytes, i);
                continue;
            }
            b'[' if long_bracket_level(bytes, i).is_some() => {
                i = skip_long_bracket(bytes, i)?;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// `text` with every `--` comment replaced by a single space. Quoted and
/// long strings are copied through untouched.
pub(crate) fn strip_comments(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = skip_quoted(bytes, i).unwrap_or(bytes.len()),
            b'[' if long_bracket_level(bytes, i).is_some() => {
                i = skip_long_bracket(bytes, i).unwrap_or(bytes.len());
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                let end = skip_comment(bytes, i);
                let buf = out.get_or_insert_with(|| String::with_capacity(text.len()));
                buf.push_str(&text[copied..i]);
                buf.push(' ');
                copied = end;
                i = end;
            }
            _ => i += 1,
        }
    }
    match out {
        Some(mut buf) => {
            buf.push_str(&text[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(text),
    }
}

/// Offset just past the closing quote of the string opening at `start`.
fn skip_quoted(bytes: &[u8], start: usize) -> Option<usize> {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Offset just past a `--` comment starting at `start`.
///
/// An unterminated long comment runs to the end of input.
fn skip_comment(bytes: &[u8], start: usize) -> usize {
    let after_dashes = start + 2;
    if long_bracket_level(bytes, after_dashes).is_some() {
        return skip_long_bracket(bytes, after_dashes).unwrap_or(bytes.len());
    }
    bytes[after_dashes..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |pos| after_dashes + pos + 1)
}

/// `Some(level)` if `[`, `=`*level, `[` starts at `start`.
fn long_bracket_level(bytes: &[u8], start: usize) -> Option<usize> {
    if bytes.get(start) != Some(&b'[') {
        return None;
    }
    let level = bytes[start + 1..].iter().take_while(|&&b| b == b'=').count();
    (bytes.get(start + 1 + level) == Some(&b'[')).then_some(level)
}

/// Offset just past the `]=*]` closing the long bracket opening at `start`.
fn skip_long_bracket(bytes: &[u8], start: usize) -> Option<usize> {
    let level = long_bracket_level(bytes, start)?;
    let mut i = start + level + 2;
    while i < bytes.len() {
        if bytes[i] == b']' {
            let equals = bytes[i + 1..].iter().take_while(|&&b| b == b'=').count();
            if equals == level && bytes.get(i + 1 + level) == Some(&b']') {
                return Some(i + level + 2);
            }
        }
        i += 1;
    }
    None
}

/// A value inside a table body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LuaValue<'a> {
    /// Body of a nested table, without the enclosing braces.
    Table(&'a str),
    /// Unescaped string literal.
    Str(String),
    /// Any other token: numbers, booleans, `nil`, bare identifiers.
    Scalar(&'a str),
}

impl LuaValue<'_> {
    pub(crate) fn as_str(&self) -> Option<&str> {
        match self {
            LuaValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// One `key = value` (or positional `value`) field of a table body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Field<'a> {
    pub key: Option<String>,
    pub value: LuaValue<'a>,
}

/// Iterates the top-level fields of a table body.
///
/// Malformed fields are skipped up to the next separator; an unterminated
/// nested table or string ends iteration.
pub(crate) fn fields(body: &str) -> Fields<'_> {
    Fields { body, pos: 0 }
}

/// Body of a table literal (`{ ... }`) without its outer braces. Input that
/// does not start with `{` is returned trimmed as-is.
pub(crate) fn table_body(literal: &str) -> &str {
    let trimmed = literal.trim();
    if trimmed.starts_with('{') {
        if let Some(close) = matching_brace(trimmed, 0) {
            return &trimmed[1..close];
        }
        return &trimmed[1..];
    }
    trimmed
}

pub(crate) struct Fields<'a> {
    body: &'a str,
    pos: usize,
}

impl<'a> Iterator for Fields<'a> {
    type Item = Field<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.skip_trivia();
            let bytes = self.body.as_bytes();
            let &first = bytes.get(self.pos)?;

            let key = match first {
                b'[' if long_bracket_level(bytes, self.pos).is_none() => {
                    match self.bracket_key() {
                        Some(key) => Some(key),
                        None => {
                            self.skip_to_separator();
                            continue;
                        }
                    }
                }
                b if b.is_ascii_alphabetic() || b == b'_' => self.named_key(),
                _ => None,
            };

            let value = self.value()?;
            return Some(Field { key, value });
        }
    }
}

impl<'a> Fields<'a> {
    fn skip_trivia(&mut self) {
        let bytes = self.body.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            if b.is_ascii_whitespace() || b == b',' || b == b';' {
                self.pos += 1;
            } else if b == b'-' && bytes.get(self.pos + 1) == Some(&b'-') {
                self.pos = skip_comment(bytes, self.pos);
            } else {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.body.as_bytes();
        while bytes.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }
    }

    /// Parses `[ "key" ] =` or `[ 12 ] =`. Leaves `pos` untouched on failure.
    fn bracket_key(&mut self) -> Option<String> {
        let bytes = self.body.as_bytes();
        let start = self.pos;
        let mut i = start + 1;
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }

        let key = match bytes.get(i)? {
            b'"' | b'\'' => {
                let end = skip_quoted(bytes, i)?;
                let key = unescape(&self.body[i + 1..end - 1]);
                i = end;
                key
            }
            _ => {
                let len = bytes[i..].iter().position(|&b| b == b']')?;
                let key = self.body[i..i + len].trim().to_string();
                i += len;
                key
            }
        };

        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        if bytes.get(i) != Some(&b']') {
            return None;
        }
        i += 1;
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            return None;
        }

        self.pos = i + 1;
        Some(key)
    }

    /// Parses `name =`. A bare identifier not followed by `=` is positional,
    /// so `pos` is left at the identifier and `None` returned.
    fn named_key(&mut self) -> Option<String> {
        let bytes = self.body.as_bytes();
        let start = self.pos;
        let mut i = start;
        while bytes
            .get(i)
            .is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'_')
        {
            i += 1;
        }
        let ident_end = i;
        while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        if bytes.get(i) == Some(&b'=') && bytes.get(i + 1) != Some(&b'=') {
            self.pos = i + 1;
            return Some(self.body[start..ident_end].to_string());
        }
        None
    }

    fn value(&mut self) -> Option<LuaValue<'a>> {
        self.skip_whitespace();
        let body: &'a str = self.body;
        let bytes = body.as_bytes();
        let start = self.pos;

        match bytes.get(start)? {
            b'{' => {
                let close = matching_brace(body, start)?;
                self.pos = close + 1;
                Some(LuaValue::Table(&body[start + 1..close]))
            }
            b'"' | b'\'' => {
                let end = skip_quoted(bytes, start)?;
                self.pos = end;
                Some(LuaValue::Str(unescape(&body[start + 1..end - 1])))
            }
            b'[' if long_bracket_level(bytes, start).is_some() => {
                let level = long_bracket_level(bytes, start)?;
                let end = skip_long_bracket(bytes, start)?;
                self.pos = end;
                let content = &body[start + level + 2..end - level - 2];
                Some(LuaValue::Str(
                    content.strip_prefix('\n').unwrap_or(content).to_string(),
                ))
            }
            _ => {
                let mut i = start;
                while let Some(&b) = bytes.get(i) {
                    let comment = b == b'-' && bytes.get(i + 1) == Some(&b'-');
                    if matches!(b, b',' | b';' | b'}' | b'\n') || comment {
                        break;
                    }
                    i += 1;
                }
                // A stray `}` would otherwise stall the iterator.
                if i == start {
                    i += 1;
                }
                self.pos = i;
                Some(LuaValue::Scalar(body[start..i].trim()))
            }
        }
    }

    /// Advances past the next top-level separator, stepping over nested
    /// tables and strings.
    fn skip_to_separator(&mut self) {
        let bytes = self.body.as_bytes();
        while let Some(&b) = bytes.get(self.pos) {
            match b {
                b',' | b';' => {
                    self.pos += 1;
                    return;
                }
                b'{' => {
                    self.pos = matching_brace(self.body, self.pos).map_or(bytes.len(), |c| c + 1);
                }
                b'"' | b'\'' => {
                    self.pos = skip_quoted(bytes, self.pos).unwrap_or(bytes.len());
                }
                _ => self.pos += 1,
            }
        }
    }
}

/// Resolves the escapes that occur in wiki data strings.
fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_brace_spans_three_levels() {
        let text = r#"x = {a = {b = {c = 1}}, d = 2} tail"#;
        let open = text.find('{').unwrap();
        let close = matching_brace(text, open).unwrap();
        assert_eq!(&text[open..=close], "{a = {b = {c = 1}}, d = 2}");
    }

    #[test]
    fn matching_brace_ignores_braces_in_strings_and_comments() {
        let text = "{ a = \"}}\", b = '{', -- } comment\n c = [[ } ]], --[[ { ]] d = 1 }";
        let close = matching_brace(text, 0).unwrap();
        assert_eq!(close, text.len() - 1);
    }

    #[test]
    fn matching_brace_handles_escaped_quotes() {
        let text = r#"{ a = "say \"}\" now" }"#;
        assert_eq!(matching_brace(text, 0), Some(text.len() - 1));
    }

    #[test]
    fn matching_brace_returns_none_when_unclosed() {
        assert_eq!(matching_brace("{ a = { b = 1 }", 0), None);
        assert_eq!(matching_brace("no brace", 0), None);
    }

    #[test]
    fn fields_reads_bracketed_named_and_positional_entries() {
        let body = r#"["id"] = 266, apiname = "Aatrox", [3] = true, "Fighter", {x = 1}"#;
        let parsed: Vec<Field<'_>> = fields(body).collect();
        assert_eq!(parsed.len(), 5);
        assert_eq!(parsed[0].key.as_deref(), Some("id"));
        assert_eq!(parsed[0].value, LuaValue::Scalar("266"));
        assert_eq!(parsed[1].key.as_deref(), Some("apiname"));
        assert_eq!(parsed[1].value.as_str(), Some("Aatrox"));
        assert_eq!(parsed[2].key.as_deref(), Some("3"));
        assert_eq!(parsed[2].value, LuaValue::Scalar("true"));
        assert_eq!(parsed[3].key, None);
        assert_eq!(parsed[3].value.as_str(), Some("Fighter"));
        assert_eq!(parsed[4].value, LuaValue::Table("x = 1"));
    }

    #[test]
    fn fields_skips_malformed_key_and_continues() {
        let body = r#"["broken" 12, ["ok"] = 1"#;
        let parsed: Vec<Field<'_>> = fields(body).collect();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].key.as_deref(), Some("ok"));
    }

    #[test]
    fn fields_skips_comments_between_entries() {
        let body = "-- header\n[\"a\"] = 1, --[[ block ]] [\"b\"] = 2 -- trailing\n";
        let keys: Vec<Option<String>> = fields(body).map(|f| f.key).collect();
        assert_eq!(keys, vec![Some("a".to_owned()), Some("b".to_owned())]);
    }

    #[test]
    fn fields_unescapes_strings() {
        let body = r#"["title"] = "the \"Darkin\" Blade""#;
        let field = fields(body).next().unwrap();
        assert_eq!(field.value.as_str(), Some("the \"Darkin\" Blade"));
    }

    #[test]
    fn strip_comments_removes_line_and_long_comments() {
        let text = "a = 1, -- b = 2\nc = 3 --[[ d = 4 ]] e = 5";
        assert_eq!(strip_comments(text), "a = 1,  c = 3   e = 5");
    }

    #[test]
    fn strip_comments_keeps_dashes_inside_strings() {
        let text = r#"title = "--not a comment", x = 1"#;
        assert!(matches!(strip_comments(text), Cow::Borrowed(_)));
    }

    #[test]
    fn table_body_strips_outer_braces() {
        assert_eq!(table_body("  { a = 1 }  "), " a = 1 ");
        assert_eq!(table_body("a = 1"), "a = 1");
    }
}
