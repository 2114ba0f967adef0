//! Response parsers for the SOS 1.0 schema family.
//!
//! Each parser is a pure function over response text. Structural absence
//! inside a document is recovered per field; only malformed XML is reported
//! as an error.

pub mod capabilities;
pub mod coordinates;
pub mod observations;
pub mod sensor_description;
pub mod time;

pub use capabilities::parse_capabilities;
pub use coordinates::{extract_coordinates, extract_position};
pub use observations::parse_observations;
pub use sensor_description::parse_sensor_description;

use crate::constants::ns;
use crate::error::{Result, SosError};
use roxmltree::Node;

/// First descendant (including `node` itself) with the given qualified name
pub(crate) fn first_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    local: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| n.is_element() && n.has_tag_name((namespace, local)))
}

/// All descendants with the given qualified name, in document order
pub(crate) fn descendants_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    namespace: &'a str,
    local: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .filter(move |n| n.is_element() && n.has_tag_name((namespace, local)))
}

/// Like [`first_descendant`] but reports absence as `MissingData`
pub(crate) fn required_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    local: &str,
) -> Result<Node<'a, 'input>> {
    first_descendant(node, namespace, local).ok_or_else(|| SosError::missing(local))
}

/// Concatenated text of all descendant text nodes
pub(crate) fn text_content(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Non-empty `xlink:href` attribute
pub(crate) fn xlink_href<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute((ns::XLINK, "href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
}

/// Non-empty `xlink:title` attribute
pub(crate) fn xlink_title<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute((ns::XLINK, "title"))
        .map(str::trim)
        .filter(|title| !title.is_empty())
}

/// Trimmed text of the first matching descendant, `None` when absent or blank
pub(crate) fn descendant_text(node: Node, namespace: &str, local: &str) -> Option<String> {
    first_descendant(node, namespace, local)
        .map(text_content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_text_content_spans_children() {
        let xml = r#"<a xmlns:gml="http://www.opengis.net/gml"><gml:pos> 1.0 <!-- c --> 2.0 </gml:pos></a>"#;
        let doc = Document::parse(xml).unwrap();
        let pos = first_descendant(doc.root(), ns::GML, "pos").unwrap();
        assert_eq!(text_content(pos).split_whitespace().count(), 2);
    }

    #[test]
    fn test_required_descendant_reports_missing() {
        let doc = Document::parse("<root/>").unwrap();
        match required_descendant(doc.root(), ns::GML, "Envelope") {
            Err(SosError::MissingData { element }) => assert_eq!(element, "Envelope"),
            other => panic!("Expected MissingData, got {:?}", other.map(|n| n.id())),
        }
    }

    #[test]
    fn test_xlink_href_ignores_blank() {
        let xml = r#"<p xmlns:xlink="http://www.w3.org/1999/xlink" xlink:href="  "/>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(xlink_href(doc.root_element()), None);
    }
}
