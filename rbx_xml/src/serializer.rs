use std::{collections::HashMap, io::Write};

use rbx_dom_weak::WeakDom;
use rbx_types::{Ref, SharedString, Variant};

use crate::{
    error::EncodeError,
    serializer_core::{XmlEventWriter, XmlWriteEvent},
    types,
};

/// Encodes `refs` (and their descendants) from `dom` as an XML model/place
/// document. Roblox model files may legitimately contain more than one
/// top-level instance, which is why this takes a slice rather than a single
/// root.
pub fn to_writer<W: Write>(dom: &WeakDom, refs: &[Ref], writer: W) -> Result<(), EncodeError> {
    let mut xml_writer = XmlEventWriter::from_output(writer);
    let mut state = XmlSerializer::new();

    xml_writer.write(XmlWriteEvent::start_element("roblox").attr("version", "4"))?;

    for &referent in refs {
        state.serialize_instance(&mut xml_writer, dom, referent)?;
    }

    state.write_shared_strings(&mut xml_writer)?;

    xml_writer.write(XmlWriteEvent::end_element())?;

    Ok(())
}

/// Carries the shared string table accumulated while walking the tree; it's
/// only known in full once every instance has been visited, so it's flushed
/// as a trailing `<SharedStrings>` sibling of the `<Item>` elements rather
/// than written inline.
struct XmlSerializer {
    shared_strings: HashMap<String, SharedString>,
}

impl XmlSerializer {
    fn new() -> Self {
        XmlSerializer {
            shared_strings: HashMap::new(),
        }
    }

    fn serialize_instance<W: Write>(
        &mut self,
        writer: &mut XmlEventWriter<W>,
        dom: &WeakDom,
        referent: Ref,
    ) -> Result<(), EncodeError> {
        let instance = dom.get_by_ref(referent).expect("referent must exist in dom");

        writer.write(
            XmlWriteEvent::start_element("Item")
                .attr("class", instance.class.as_str())
                .attr("referent", &referent.to_string()),
        )?;

        writer.write(XmlWriteEvent::start_element("Properties"))?;

        types::write_value_xml(writer, "Name", &Variant::String(instance.name.clone()))?;

        for (prop_name, value) in &instance.properties {
            match value {
                Variant::Ref(target) => self.write_ref_property(writer, prop_name, *target)?,
                Variant::SharedString(shared) => self.write_shared_string_property(writer, prop_name, shared)?,
                other => types::write_value_xml(writer, prop_name, other)?,
            }
        }

        writer.write(XmlWriteEvent::end_element())?;

        for &child in instance.children() {
            self.serialize_instance(writer, dom, child)?;
        }

        writer.write(XmlWriteEvent::end_element())
    }

    fn write_ref_property<W: Write>(
        &mut self,
        writer: &mut XmlEventWriter<W>,
        name: &str,
        target: Ref,
    ) -> Result<(), EncodeError> {
        writer.write(XmlWriteEvent::start_element("Ref").attr("name", name))?;

        if target.is_some() {
            writer.write_characters(target.to_string())?;
        } else {
            writer.write_characters("null")?;
        }

        writer.write(XmlWriteEvent::end_element())
    }

    fn write_shared_string_property<W: Write>(
        &mut self,
        writer: &mut XmlEventWriter<W>,
        name: &str,
        value: &SharedString,
    ) -> Result<(), EncodeError> {
        let key = base64::encode(value.hash().as_bytes());
        self.shared_strings.entry(key.clone()).or_insert_with(|| value.clone());

        writer.write(XmlWriteEvent::start_element("SharedString").attr("name", name))?;
        writer.write_characters(key)?;
        writer.write(XmlWriteEvent::end_element())
    }

    fn write_shared_strings<W: Write>(&self, writer: &mut XmlEventWriter<W>) -> Result<(), EncodeError> {
        if self.shared_strings.is_empty() {
            return Ok(());
        }

        writer.write(XmlWriteEvent::start_element("SharedStrings"))?;

        for (key, value) in &self.shared_strings {
            writer.write(XmlWriteEvent::start_element("SharedString").attr("md5", key.as_str()))?;
            writer.write(XmlWriteEvent::cdata(&base64::encode(value.data())))?;
            writer.write(XmlWriteEvent::end_element())?;
        }

        writer.write(XmlWriteEvent::end_element())
    }
}
