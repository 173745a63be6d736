use std::io::{Cursor, Read};

use roxmltree::{Document, Node};
use zip::ZipArchive;

use super::ExtractionError;

const BODY_PART: &str = "word/document.xml";
const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Paragraph text from the main document part, one paragraph per line.
pub(super) fn extract_text(data: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let mut xml = String::new();
    archive.by_name(BODY_PART)?.read_to_string(&mut xml)?;

    let doc = Document::parse(&xml)?;
    let paragraphs: Vec<String> = doc
        .descendants()
        .filter(|n| is_wordml(n, "p"))
        .map(paragraph_text)
        .collect();

    Ok(paragraphs.join("\n"))
}

fn paragraph_text(paragraph: Node) -> String {
    let mut text = String::new();
    for node in paragraph.descendants().skip(1) {
        // Text boxes nest whole paragraphs; those are emitted on their own.
        if owning_paragraph(node) != Some(paragraph) {
            continue;
        }
        if is_wordml(&node, "t") {
            text.push_str(node.text().unwrap_or_default());
        } else if is_wordml(&node, "tab") {
            text.push('\t');
        } else if is_wordml(&node, "br") || is_wordml(&node, "cr") {
            text.push('\n');
        }
    }
    text
}

fn owning_paragraph<'a, 'input>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    node.ancestors().skip(1).find(|n| is_wordml(n, "p"))
}

fn is_wordml(node: &Node, local: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && node.tag_name().namespace() == Some(WORDML_NS)
}
