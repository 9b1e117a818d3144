// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::TemplateError;

#[test]
fn parses_nested_elements() {
    let tree = parse_document(
        "page.xml",
        "<xmltemplate><template><h1>Title</h1></template></xmltemplate>",
    )
    .unwrap();
    let root = tree.root();
    assert_eq!(tree.name(root), Some("xmltemplate"));

    let template = tree.children(root)[0];
    assert_eq!(tree.name(template), Some("template"));
    let h1 = tree.children(template)[0];
    assert_eq!(tree.name(h1), Some("h1"));
    assert_eq!(tree.text_content(h1), "Title");
}

#[test]
fn parses_attributes_with_lowercased_names() {
    let tree = parse_document("page.xml", "<root><data Name='footer' ID=\"x\"/></root>").unwrap();
    let data = tree.children(tree.root())[0];
    assert_eq!(tree.attr(data, "name"), Some("footer"));
    assert_eq!(tree.attr(data, "id"), Some("x"));
}

#[test]
fn skips_declaration_doctype_and_comments() {
    let text = "\
<?xml version=\"1.0\"?>
<!DOCTYPE xmltemplate>
<!-- header comment -->
<root><!-- inner --><a/></root>
<!-- trailer -->";
    let tree = parse_document("page.xml", text).unwrap();
    let children: Vec<_> = tree
        .children(tree.root())
        .iter()
        .filter(|c| tree.is_element(**c))
        .copied()
        .collect();
    assert_eq!(children.len(), 1);
    assert_eq!(tree.name(children[0]), Some("a"));
}

#[test]
fn decodes_entities() {
    let tree = parse_document("page.xml", "<root>a &amp; b &lt;c&gt; &#65;&#x42;</root>").unwrap();
    assert_eq!(tree.text_content(tree.root()), "a & b <c> AB");
}

#[test]
fn cdata_is_raw_text() {
    let tree =
        parse_document("page.xml", "<root><![CDATA[<b>not markup</b> & such]]></root>").unwrap();
    assert_eq!(tree.text_content(tree.root()), "<b>not markup</b> & such");
}

#[test]
fn entities_in_attributes_are_decoded() {
    let tree = parse_document("page.xml", "<root a=\"x &amp; y\"/>").unwrap();
    assert_eq!(tree.attr(tree.root(), "a"), Some("x & y"));
}

#[yare::parameterized(
    mismatched_close = { "<root><a></b></root>" },
    unterminated     = { "<root><a>" },
    bare_attribute   = { "<root><a name/></root>" },
    unknown_entity   = { "<root>&nope;</root>" },
    trailing_content = { "<root/><root/>" },
)]
fn malformed_documents_are_rejected(text: &str) {
    match parse_document("page.xml", text) {
        Err(TemplateError::Parse { file, .. }) => assert_eq!(file, "page.xml"),
        other => panic!("expected parse error for {:?}, got {:?}", text, other.map(|_| ())),
    }
}

#[test]
fn parse_error_carries_line_number() {
    let text = "<root>\n<a>\n</b>\n</root>";
    match parse_document("page.xml", text) {
        Err(TemplateError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected parse error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn self_closing_root() {
    let tree = parse_document("page.xml", "<root/>").unwrap();
    assert!(tree.children(tree.root()).is_empty());
}

#[test]
fn close_tag_case_is_insensitive() {
    let tree = parse_document("page.xml", "<ROOT><DATA name=\"x\">v</data></ROOT>").unwrap();
    assert_eq!(tree.name(tree.root()), Some("ROOT"));
}
