use prosediff::markdown::{extract_links, to_plain_text, ListKind};
use prosediff::{parse_semantic_lines, BlockType};

#[test]
fn test_mixed_document() {
    let doc = "# Guide\n\nIntro with `code` and ~~old~~ text.\n\n1. First\n   - nested\n\n| Col | Col |\n\n```bash\necho hi\n```";
    let lines = parse_semantic_lines(doc);
    let kinds: Vec<BlockType> = lines.iter().map(|l| l.block_type).collect();
    assert_eq!(
        kinds,
        vec![
            BlockType::Heading,
            BlockType::Blank,
            BlockType::Paragraph,
            BlockType::Blank,
            BlockType::ListItem,
            BlockType::ListItem,
            BlockType::Blank,
            BlockType::TableRow,
            BlockType::Blank,
            BlockType::CodeFenceOpen,
            BlockType::CodeLine,
            BlockType::CodeFenceOpen,
        ]
    );
    assert_eq!(lines[2].formatting.inline_code, 1);
    assert_eq!(lines[2].formatting.strikethrough, 1);
    assert_eq!(lines[2].plain_text, "Intro with code and old text.");
    assert_eq!(lines[4].list_kind, Some(ListKind::Ordered));
    assert_eq!(lines[5].list_indent, Some(3));
    assert_eq!(lines[7].table_column_count, Some(2));
    assert_eq!(lines[9].code_fence_lang.as_deref(), Some("bash"));
    assert_eq!(lines[11].line_number, 12);
}

#[test]
fn test_unclosed_fence_swallows_rest() {
    let lines = parse_semantic_lines("```\n# not heading\n- not list");
    assert!(lines[1..].iter().all(|l| l.block_type == BlockType::CodeLine));
}

#[test]
fn test_link_text_kept_in_plain_text() {
    assert_eq!(
        to_plain_text("See [the docs](https://x.dev) and ![img](a.png)"),
        "See the docs and !img"
    );
    assert_eq!(extract_links("![img](a.png)").len(), 0);
}

#[test]
fn test_line_serializes_snake_case_block_type() {
    let lines = parse_semantic_lines("- item");
    let json = serde_json::to_value(&lines[0]).unwrap();
    assert_eq!(json["block_type"], "list_item");
    assert_eq!(json["list_kind"], "unordered");
}
