// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strict reader for template XML.
//!
//! Covers the subset template files actually use: elements, attributes,
//! character data, comments, CDATA sections, an optional XML declaration
//! and doctype, and the five predefined entities plus numeric character
//! references. Anything else is a parse error with a line number.

use crate::error::TemplateError;
use crate::tree::{NodeId, XmlTree};

/// Parse template XML text into a tree. `file` only labels errors.
pub fn parse_document(file: &str, text: &str) -> Result<XmlTree, TemplateError> {
    let mut reader = Reader::new(file, text);
    reader.skip_prolog()?;

    let (name, attrs, self_closing) = reader.read_open_tag()?;
    let mut tree = XmlTree::new(&name);
    let root = tree.root();
    for (key, value) in attrs {
        tree.set_attr(root, &key, &value);
    }
    if !self_closing {
        reader.read_content(&mut tree, root, &name)?;
    }

    reader.skip_misc();
    if !reader.at_end() {
        return Err(reader.error("content after document root"));
    }
    Ok(tree)
}

struct Reader<'a> {
    file: &'a str,
    bytes: &'a [u8],
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Reader<'a> {
    fn new(file: &'a str, src: &'a str) -> Self {
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Self {
            file,
            bytes: src.as_bytes(),
            src,
            pos: 0,
            line: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> TemplateError {
        TemplateError::Parse {
            file: self.file.to_string(),
            line: self.line,
            message: message.into(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        if byte == b'\n' {
            self.line += 1;
        }
        self.pos += 1;
        Some(byte)
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.src[self.pos..].starts_with(prefix)
    }

    fn skip_until(&mut self, marker: &str) -> Result<(), TemplateError> {
        while !self.at_end() {
            if self.starts_with(marker) {
                for _ in 0..marker.len() {
                    self.bump();
                }
                return Ok(());
            }
            self.bump();
        }
        Err(self.error(format!("unterminated section, expected '{}'", marker)))
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.bump();
        }
    }

    // Whitespace, XML declaration, doctype, and comments before the root.
    fn skip_prolog(&mut self) -> Result<(), TemplateError> {
        loop {
            self.skip_ws();
            if self.starts_with("<?") {
                self.skip_until("?>")?;
            } else if self.starts_with("<!--") {
                self.skip_until("-->")?;
            } else if self.starts_with("<!") {
                self.skip_until(">")?;
            } else {
                return Ok(());
            }
        }
    }

    // Trailing whitespace and comments after the root.
    fn skip_misc(&mut self) {
        loop {
            self.skip_ws();
            if self.starts_with("<!--") && self.skip_until("-->").is_ok() {
                continue;
            }
            return;
        }
    }

    fn read_name(&mut self) -> Result<String, TemplateError> {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                self.bump();
            }
            _ => return Err(self.error("expected a name")),
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':') {
                self.bump();
            } else {
                break;
            }
        }
        Ok(self.src[start..self.pos].to_string())
    }

    // Reads `<name attr="value" ...>` or `<name ... />`. The caller has
    // checked that the next byte is '<' and not a special construct.
    #[allow(clippy::type_complexity)]
    fn read_open_tag(&mut self) -> Result<(String, Vec<(String, String)>, bool), TemplateError> {
        if self.bump() != Some(b'<') {
            return Err(self.error("expected '<'"));
        }
        let name = self.read_name()?;
        let mut attrs = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'>') => {
                    self.bump();
                    return Ok((name, attrs, false));
                }
                Some(b'/') => {
                    self.bump();
                    if self.bump() != Some(b'>') {
                        return Err(self.error("expected '>' after '/'"));
                    }
                    return Ok((name, attrs, true));
                }
                Some(_) => {
                    let key = self.read_name()?;
                    self.skip_ws();
                    if self.bump() != Some(b'=') {
                        return Err(self.error(format!("attribute '{}' has no value", key)));
                    }
                    self.skip_ws();
                    let value = self.read_quoted()?;
                    attrs.push((key, value));
                }
                None => return Err(self.error(format!("unterminated <{}> tag", name))),
            }
        }
    }

    fn read_quoted(&mut self) -> Result<String, TemplateError> {
        let quote = match self.bump() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.error("expected quoted attribute value")),
        };
        let mut raw = String::new();
        loop {
            match self.peek() {
                Some(b) if b == quote => {
                    self.bump();
                    return self.decode_entities(&raw);
                }
                Some(_) => {
                    let start = self.pos;
                    self.bump();
                    // keep multi-byte characters intact
                    while !self.src.is_char_boundary(self.pos) {
                        self.bump();
                    }
                    raw.push_str(&self.src[start..self.pos]);
                }
                None => return Err(self.error("unterminated attribute value")),
            }
        }
    }

    fn read_close_tag(&mut self, expected: &str) -> Result<(), TemplateError> {
        // caller consumed "</"
        let name = self.read_name()?;
        self.skip_ws();
        if self.bump() != Some(b'>') {
            return Err(self.error(format!("unterminated </{}> tag", name)));
        }
        if !name.eq_ignore_ascii_case(expected) {
            return Err(self.error(format!(
                "mismatched close tag: expected </{}>, found </{}>",
                expected, name
            )));
        }
        Ok(())
    }

    fn read_content(
        &mut self,
        tree: &mut XmlTree,
        parent: NodeId,
        parent_name: &str,
    ) -> Result<(), TemplateError> {
        loop {
            if self.at_end() {
                return Err(self.error(format!("unterminated <{}> element", parent_name)));
            }
            if self.starts_with("</") {
                self.bump();
                self.bump();
                return self.read_close_tag(parent_name);
            }
            if self.starts_with("<!--") {
                self.skip_until("-->")?;
                continue;
            }
            if self.starts_with("<![CDATA[") {
                let start = self.pos + "<![CDATA[".len();
                self.skip_until("]]>")?;
                let end = self.pos - "]]>".len();
                let text = tree.new_text(&self.src[start..end]);
                tree.append(parent, text);
                continue;
            }
            if self.starts_with("<?") {
                self.skip_until("?>")?;
                continue;
            }
            if self.peek() == Some(b'<') {
                let (name, attrs, self_closing) = self.read_open_tag()?;
                let element = tree.new_element(&name);
                for (key, value) in attrs {
                    tree.set_attr(element, &key, &value);
                }
                tree.append(parent, element);
                if !self_closing {
                    self.read_content(tree, element, &name)?;
                }
                continue;
            }
            // Character data up to the next markup.
            let start = self.pos;
            while !self.at_end() && self.peek() != Some(b'<') {
                self.bump();
            }
            let decoded = self.decode_entities(&self.src[start..self.pos].to_string())?;
            let text = tree.new_text(&decoded);
            tree.append(parent, text);
        }
    }

    fn decode_entities(&self, raw: &str) -> Result<String, TemplateError> {
        if !raw.contains('&') {
            return Ok(raw.to_string());
        }
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            rest = &rest[amp..];
            let Some(semi) = rest.find(';') else {
                return Err(self.error("unterminated entity reference"));
            };
            let entity = &rest[1..semi];
            match entity {
                "amp" => out.push('&'),
                "lt" => out.push('<'),
                "gt" => out.push('>'),
                "quot" => out.push('"'),
                "apos" => out.push('\''),
                _ => {
                    let code = if let Some(hex) = entity.strip_prefix("#x") {
                        u32::from_str_radix(hex, 16).ok()
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse().ok()
                    } else {
                        None
                    };
                    match code.and_then(char::from_u32) {
                        Some(c) => out.push(c),
                        None => {
                            return Err(
                                self.error(format!("unknown entity reference '&{};'", entity))
                            )
                        }
                    }
                }
            }
            rest = &rest[semi + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
