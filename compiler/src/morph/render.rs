//! Script rendering.
//!
//! Serializes a finished [`ScriptDocument`] to XML text. Rendering is pure:
//! the same document and parameters always produce the same bytes.

use encoding_rs::Encoding;
use std::fmt::Write;

use crate::config::RenderConfig;
use crate::diagnostics::log_error;
use crate::error::{RenderError, RenderResult};
use crate::morph::escape::{escape_attribute, escape_text, is_xml_name};
use crate::morph::tree::{Element, ScriptDocument};

/// Serializer for script documents, borrowing the process-wide configuration.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    config: &'a RenderConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        self.config
    }

    /// Render to text, or `None` after logging why not.
    pub fn render(
        &self,
        document: &ScriptDocument,
        indent: bool,
        encoding: &str,
    ) -> Option<String> {
        match self.try_render(document, indent, encoding) {
            Ok(text) => Some(text),
            Err(e) => {
                log_error(format!("couldn't render script: {}", e));
                None
            }
        }
    }

    /// Render to text in the given encoding.
    ///
    /// Characters the encoding cannot represent become numeric character
    /// references, so the text decodes back losslessly from the encoded bytes.
    pub fn try_render(
        &self,
        document: &ScriptDocument,
        indent: bool,
        encoding: &str,
    ) -> RenderResult<String> {
        let encoding = resolve_encoding(encoding)?;
        let xml = self.serialize(document, indent, encoding)?;

        if encoding == encoding_rs::UTF_8 {
            return Ok(xml);
        }

        let (bytes, _, _) = encoding.encode(&xml);
        let (text, _) = encoding.decode_without_bom_handling(&bytes);
        Ok(text.into_owned())
    }

    /// Render to bytes in the given encoding.
    pub fn try_render_bytes(
        &self,
        document: &ScriptDocument,
        indent: bool,
        encoding: &str,
    ) -> RenderResult<Vec<u8>> {
        let encoding = resolve_encoding(encoding)?;
        let xml = self.serialize(document, indent, encoding)?;
        let (bytes, _, _) = encoding.encode(&xml);
        Ok(bytes.into_owned())
    }

    fn serialize(
        &self,
        document: &ScriptDocument,
        indent: bool,
        encoding: &'static Encoding,
    ) -> RenderResult<String> {
        let mut out = String::new();
        write!(
            out,
            "<?xml version=\"{}\" encoding=\"{}\" standalone=\"no\"?>",
            self.config.xml_version,
            encoding.name()
        )?;
        if indent {
            out.push('\n');
        }

        self.write_element(&mut out, &document.to_element(), 0, indent)?;
        if indent {
            out.push('\n');
        }

        Ok(out)
    }

    /// Write one element and its subtree.
    ///
    /// Fails on element or attribute names that are not XML names.
    fn write_element<W: Write>(
        &self,
        out: &mut W,
        element: &Element,
        depth: usize,
        indent: bool,
    ) -> RenderResult<()> {
        check_name("element", element.name())?;

        let pad = if indent {
            " ".repeat(depth * self.config.indent_width)
        } else {
            String::new()
        };

        write!(out, "{}<{}", pad, element.name())?;
        for (key, value) in element.attributes() {
            check_name("attribute", key)?;
            write!(out, " {}=\"{}\"", key, escape_attribute(value))?;
        }

        match (element.children().is_empty(), element.text()) {
            (true, None) => out.write_str("/>")?,
            (true, Some(text)) => write!(out, ">{}</{}>", escape_text(text), element.name())?,
            (false, text) => {
                out.write_char('>')?;
                if let Some(text) = text {
                    out.write_str(&escape_text(text))?;
                }
                for child in element.children() {
                    if indent {
                        out.write_char('\n')?;
                    }
                    self.write_element(out, child, depth + 1, indent)?;
                }
                if indent {
                    write!(out, "\n{}", pad)?;
                }
                write!(out, "</{}>", element.name())?;
            }
        }

        Ok(())
    }
}

fn check_name(kind: &'static str, name: &str) -> RenderResult<()> {
    if is_xml_name(name) {
        Ok(())
    } else {
        Err(RenderError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

/// Look up an encoding by label; UTF-16 labels resolve to their output encoding.
fn resolve_encoding(label: &str) -> RenderResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .map(Encoding::output_encoding)
        .ok_or_else(|| RenderError::UnsupportedEncoding(label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> ScriptDocument {
        let root = Element::new("metamorph").with_attr("version", "1");
        let mut doc = ScriptDocument::new(root, "task");
        doc.push_rule(
            Element::new("data")
                .with_attr("source", "a.b")
                .with_attr("name", "@x")
                .with_child(Element::new("trim")),
        );
        doc
    }

    #[test]
    fn test_render_compact() {
        let config = RenderConfig::default();
        let text = Renderer::new(&config).try_render(&document(), false, "UTF-8").unwrap();
        assert_eq!(
            text,
            "<?xml version=\"1.1\" encoding=\"UTF-8\" standalone=\"no\"?>\
             <metamorph version=\"1\"><meta><name>task</name></meta>\
             <rules><data source=\"a.b\" name=\"@x\"><trim/></data></rules><maps/></metamorph>"
        );
    }

    #[test]
    fn test_render_indented() {
        let config = RenderConfig::default().with_indent_width(2);
        let text = Renderer::new(&config).try_render(&document(), true, "utf-8").unwrap();
        let expected = [
            "<?xml version=\"1.1\" encoding=\"UTF-8\" standalone=\"no\"?>\n",
            "<metamorph version=\"1\">\n",
            "  <meta>\n    <name>task</name>\n  </meta>\n",
            "  <rules>\n",
            "    <data source=\"a.b\" name=\"@x\">\n      <trim/>\n    </data>\n",
            "  </rules>\n",
            "  <maps/>\n",
            "</metamorph>\n",
        ]
        .concat();
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_is_idempotent() {
        let config = RenderConfig::default();
        let renderer = Renderer::new(&config);
        let doc = document();
        assert_eq!(renderer.render(&doc, true, "UTF-8"), renderer.render(&doc, true, "UTF-8"));
    }

    #[test]
    fn test_unsupported_encoding() {
        let config = RenderConfig::default();
        let renderer = Renderer::new(&config);
        assert!(matches!(
            renderer.try_render(&document(), false, "no-such-charset"),
            Err(RenderError::UnsupportedEncoding(_))
        ));
        assert!(renderer.render(&document(), false, "no-such-charset").is_none());
    }

    #[test]
    fn test_legacy_encoding_uses_character_references() {
        let config = RenderConfig::default();
        let mut doc = ScriptDocument::new(Element::new("metamorph"), "Größe €");
        doc.push_rule(Element::new("data").with_attr("source", "日本"));

        let renderer = Renderer::new(&config);
        let text = renderer.try_render(&doc, false, "ISO-8859-2").unwrap();
        assert!(text.contains("encoding=\"ISO-8859-2\""));
        assert!(text.contains("Größe"));
        assert!(text.contains("&#26085;&#26412;"));

        let bytes = renderer.try_render_bytes(&doc, false, "ISO-8859-2").unwrap();
        assert!(bytes.contains(&0xF6));
        assert!(!bytes.windows(3).any(|w| w == "日".as_bytes()));
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let config = RenderConfig::default();
        let mut doc = ScriptDocument::new(Element::new("metamorph"), "t");
        doc.push_rule(Element::new("regexp").with_attr("match", "^a<b&\"c\"$"));

        let text = Renderer::new(&config).try_render(&doc, false, "UTF-8").unwrap();
        assert!(text.contains("match=\"^a&lt;b&amp;&quot;c&quot;$\""));
    }

    #[test]
    fn test_invalid_names_fail_rendering() {
        let config = RenderConfig::default();
        let renderer = Renderer::new(&config);

        let mut doc = ScriptDocument::new(Element::new("metamorph"), "t");
        doc.push_rule(Element::new("bad name\""));
        assert!(matches!(
            renderer.try_render(&doc, false, "UTF-8"),
            Err(RenderError::InvalidName { kind: "element", .. })
        ));
        assert!(renderer.render(&doc, false, "UTF-8").is_none());

        let mut doc = ScriptDocument::new(Element::new("metamorph"), "t");
        doc.push_rule(Element::new("trim").with_attr("x y", "1"));
        assert!(matches!(
            renderer.try_render_bytes(&doc, true, "UTF-8"),
            Err(RenderError::InvalidName { kind: "attribute", .. })
        ));
    }
}
