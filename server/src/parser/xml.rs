//! XML Flattening
//!
//! Pull-parses a message document into its leaf elements, keeping each
//! leaf's ancestry so nested containers can be told apart.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{XmlField, XmlFields};
use crate::error::{GatewayError, GatewayResult};

struct OpenElement {
    name: String,
    text: String,
    has_children: bool,
}

/// Flatten `xml` into its leaf fields, in document order.
///
/// Paths exclude the document root, so `<xml><A>1</A></xml>` yields a
/// top-level field `A`. Text of elements that have child elements is
/// dropped.
pub fn flatten(xml: &str) -> GatewayResult<XmlFields> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut fields = XmlFields::default();
    let mut saw_root = false;

    loop {
        match reader.read_event().map_err(GatewayError::malformed)? {
            Event::Start(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent.has_children = true;
                } else if saw_root {
                    return Err(GatewayError::malformed("multiple root elements"));
                }
                saw_root = true;
                stack.push(OpenElement {
                    name: element_name(e.name().as_ref()),
                    text: String::new(),
                    has_children: false,
                });
            }
            Event::Empty(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent.has_children = true;
                    fields.push(XmlField {
                        path: path_of(&stack),
                        name: element_name(e.name().as_ref()),
                        value: String::new(),
                    });
                } else if saw_root {
                    return Err(GatewayError::malformed("multiple root elements"));
                } else {
                    saw_root = true;
                }
            }
            Event::Text(t) => {
                if let Some(open) = stack.last_mut() {
                    open.text
                        .push_str(&t.unescape().map_err(GatewayError::malformed)?);
                }
            }
            Event::CData(c) => {
                if let Some(open) = stack.last_mut() {
                    let text = std::str::from_utf8(&c).map_err(GatewayError::malformed)?;
                    open.text.push_str(text);
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| GatewayError::malformed("unbalanced end tag"))?;
                if !element.has_children && !stack.is_empty() {
                    fields.push(XmlField {
                        path: path_of(&stack),
                        name: element.name,
                        value: element.text,
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(GatewayError::malformed("unclosed element"));
    }
    if !saw_root {
        return Err(GatewayError::malformed("empty document"));
    }

    Ok(fields)
}

fn element_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Ancestry below the document root.
fn path_of(stack: &[OpenElement]) -> Vec<String> {
    stack.iter().skip(1).map(|e| e.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_top_level_fields() {
        let fields = flatten(
            "<xml><ToUserName><![CDATA[gh_1]]></ToUserName><CreateTime>100</CreateTime></xml>",
        )
        .unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("ToUserName"), Some("gh_1"));
        assert_eq!(fields.get("CreateTime"), Some("100"));
        assert!(fields.iter().all(XmlField::is_top_level));
    }

    #[test]
    fn keeps_ancestry_of_nested_fields() {
        let fields = flatten(
            "<xml><SendPicsInfo><Count>2</Count><PicList>\
             <item><PicMd5Sum>aaa</PicMd5Sum></item>\
             <item><PicMd5Sum>bbb</PicMd5Sum></item>\
             </PicList></SendPicsInfo></xml>",
        )
        .unwrap();
        let sums: Vec<_> = fields
            .iter()
            .filter(|f| f.name == "PicMd5Sum")
            .map(|f| (f.path.join("/"), f.value.as_str()))
            .collect();
        assert_eq!(
            sums,
            vec![
                ("SendPicsInfo/PicList/item".to_string(), "aaa"),
                ("SendPicsInfo/PicList/item".to_string(), "bbb"),
            ]
        );
        assert_eq!(fields.get("Count"), None);
        assert!(fields.iter().any(|f| f.name == "Count" && f.within("SendPicsInfo")));
    }

    #[test]
    fn unescapes_text_and_keeps_cdata_verbatim() {
        let fields =
            flatten("<xml><A>a &amp; b</A><B><![CDATA[<b>&amp;</b>]]></B><C/></xml>").unwrap();
        assert_eq!(fields.get("A"), Some("a & b"));
        assert_eq!(fields.get("B"), Some("<b>&amp;</b>"));
        assert_eq!(fields.get("C"), Some(""));
    }

    #[test]
    fn rejects_malformed_documents() {
        for doc in ["<xml><A>1</B></xml>", "<xml><A>1</A>", "", "not xml", "<a/><b/>"] {
            assert!(
                matches!(flatten(doc), Err(GatewayError::MalformedPayload(_))),
                "accepted {doc:?}"
            );
        }
    }
}
