//! Drives a [`dt_xsd::streaming::Validator`] directly from `quick_xml`'s event stream, without
//! ever building a `roxmltree::Document`: `SaxPlug` owns the `NsReader` and feeds its
//! `start_element`/`text`/`end_element` events to the validator one token at a time, the way a
//! true streaming schema processor is expected to. Malformed XML (a `quick_xml::Error`) aborts the
//! scan; a schema-validity violation instead lands on the `Validator` itself and parsing continues
//! (mirroring `skipDepth` recovery), exactly as with the `roxmltree`-replaying `validate_document`.

use std::io::BufRead;

use dt_xsd::streaming::{AttributeEvent, ElementStart, Validator};
use dt_xsd::xstypes::QName as XsdQName;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName, ResolveResult};
use quick_xml::reader::NsReader;

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub struct SaxPlug<R: BufRead> {
    reader: NsReader<R>,
}

impl<R: BufRead> SaxPlug<R> {
    pub fn new(reader: NsReader<R>) -> Self {
        Self { reader }
    }

    /// Consumes the reader, feeding every element/text/end event into `validator` in document
    /// order.
    pub fn drive(mut self, validator: &mut Validator<'_>) -> Result<(), quick_xml::Error> {
        let mut buf = Vec::new();
        loop {
            let (ns, event) = self.reader.read_resolved_event_into(&mut buf)?;
            match event {
                Event::Start(e) => {
                    let start = Self::element_start(&self.reader, ns, &e)?;
                    let _ = validator.start_element(start);
                }
                Event::Empty(e) => {
                    let start = Self::element_start(&self.reader, ns, &e)?;
                    let _ = validator.start_element(start);
                    let _ = validator.end_element();
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    validator.text(&text);
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    validator.text(&text);
                }
                Event::End(_) => {
                    let _ = validator.end_element();
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(())
    }

    fn element_start(
        reader: &NsReader<R>,
        ns: ResolveResult,
        e: &BytesStart,
    ) -> Result<ElementStart, quick_xml::Error> {
        let local_name = decode(e.name().local_name().as_ref());
        let namespace = bound_namespace(ns);

        let mut attributes = Vec::new();
        let mut xsi_nil = None;
        let mut xsi_type = None;

        for attr in e.attributes() {
            let attr = attr?;
            if attr.key.as_ref() == b"xmlns" || attr.key.as_ref().starts_with(b"xmlns:") {
                continue;
            }

            let (attr_ns, attr_local) = reader.resolve_attribute(attr.key);
            let local = decode(attr_local.as_ref());
            let value = attr.decode_and_unescape_value(reader.decoder())?.into_owned();
            let namespace = bound_namespace(attr_ns);

            if namespace.as_deref() == Some(XSI_NAMESPACE) && local == "nil" {
                xsi_nil = Some(value);
                continue;
            }
            if namespace.as_deref() == Some(XSI_NAMESPACE) && local == "type" {
                xsi_type = Some(resolve_qname_value(reader, &value));
                continue;
            }

            attributes.push(AttributeEvent {
                qname: XsdQName::with_optional_namespace(namespace, local),
                value,
            });
        }

        Ok(ElementStart {
            qname: XsdQName::with_optional_namespace(namespace, local_name),
            attributes,
            xsi_nil,
            xsi_type,
        })
    }
}

fn bound_namespace(resolved: ResolveResult) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(decode(ns.as_ref())),
        _ => None,
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Resolves a (possibly prefixed) QName appearing as an `xsi:type` *value* rather than an element
/// or attribute name, against the reader's current in-scope namespace bindings.
fn resolve_qname_value<R: BufRead>(reader: &NsReader<R>, value: &str) -> XsdQName {
    let trimmed = value.trim();
    let (resolved, local) = reader.resolve(QName(trimmed.as_bytes()), false);
    XsdQName::with_optional_namespace(bound_namespace(resolved), decode(local.as_ref()))
}
