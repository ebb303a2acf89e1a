use std::{collections::HashMap, io::Read};

use log::trace;
use rbx_dom_weak::{InstanceBuilder, WeakDom};
use rbx_types::{Ref, SharedString, Variant, VariantType};

use crate::{
    core,
    deserializer_core::{OwnedAttribute, XmlEventReader, XmlReadEvent},
    error::{DecodeError, DecodeErrorCause, DecodeWarning},
    types,
};

/// The result of a successful decode: the tree plus any non-fatal issues
/// encountered while resolving it.
pub struct DecodeResult {
    pub dom: WeakDom,
    pub warnings: Vec<DecodeWarning>,
}

/// Decodes an XML model/place document (`.rbxmx`/`.rbxlx`) from `reader`.
pub fn from_reader<R: Read>(reader: R) -> Result<DecodeResult, DecodeError> {
    DecodeOptions::new().decode(reader)
}

/// Disambiguates an ambiguous property's type when its first-seen value
/// can't carry enough information on its own. The XML codec only consults
/// this for properties whose tag alone doesn't pin down the final type
/// (`Int32`/`Float32` widening to the 64-bit forms of the same property
/// name elsewhere in the tree); it isn't needed for the common case, since
/// every XML tag already names its own type.
pub trait PropertyTypeHint {
    fn hint(&self, class: &str, prop: &str) -> Option<VariantType>;
}

#[derive(Default)]
pub struct DecodeOptions {
    hint: Option<Box<dyn PropertyTypeHint>>,
}

impl DecodeOptions {
    pub fn new() -> Self {
        DecodeOptions { hint: None }
    }

    pub fn with_hint(mut self, hint: impl PropertyTypeHint + 'static) -> Self {
        self.hint = Some(Box::new(hint));
        self
    }

    pub fn decode<R: Read>(&self, reader: R) -> Result<DecodeResult, DecodeError> {
        let mut xml_reader = XmlEventReader::from_source(reader);

        // xml-rs always opens with a StartDocument event.
        match xml_reader.expect_next()? {
            XmlReadEvent::StartDocument { .. } => {}
            other => {
                return Err(xml_reader.error(DecodeErrorCause::UnexpectedXmlEvent(format!("{:?}", other))))
            }
        }

        let attributes = xml_reader.expect_start_with_name("roblox")?;
        verify_version(&xml_reader, &attributes)?;

        let mut state = XmlDeserializer::new(self.hint.as_deref());

        loop {
            match xml_reader.expect_peek()? {
                XmlReadEvent::StartElement { name, .. } => match name.local_name.as_str() {
                    "Item" => {
                        let root = state.dom.root_ref();
                        state.deserialize_instance(&mut xml_reader, root)?;
                    }
                    "SharedStrings" => state.deserialize_shared_strings(&mut xml_reader)?,
                    _ => xml_reader.eat_unknown_tag()?,
                },
                XmlReadEvent::EndElement { name } if name.local_name == "roblox" => {
                    xml_reader.expect_next()?;
                    break;
                }
                XmlReadEvent::EndDocument => break,
                _ => {
                    xml_reader.expect_next()?;
                }
            }
        }

        state.resolve_deferred();

        Ok(DecodeResult {
            dom: state.dom,
            warnings: state.warnings,
        })
    }
}

fn verify_version<R: Read>(reader: &XmlEventReader<R>, attributes: &[OwnedAttribute]) -> Result<(), DecodeError> {
    let version = attributes
        .iter()
        .find(|attr| attr.name.local_name == "version")
        .map(|attr| attr.value.as_str());

    if version == Some("4") {
        Ok(())
    } else {
        Err(reader.error(DecodeErrorCause::WrongDocVersion))
    }
}

/// `""`, `"null"`, and `"nil"` have all been used across Roblox's history to
/// mean "this Reference property points at nothing."
fn is_empty_referent(text: &str) -> bool {
    matches!(text, "" | "null" | "nil")
}

struct DeferredRef {
    instance: Ref,
    class_name: String,
    prop_name: String,
    referent: String,
}

struct DeferredSharedString {
    instance: Ref,
    class_name: String,
    prop_name: String,
    key: String,
}

struct XmlDeserializer<'a> {
    dom: WeakDom,
    referents: HashMap<String, Ref>,
    shared_strings: HashMap<String, SharedString>,
    deferred_refs: Vec<DeferredRef>,
    deferred_shared_strings: Vec<DeferredSharedString>,
    warnings: Vec<DecodeWarning>,
    hint: Option<&'a dyn PropertyTypeHint>,
}

impl<'a> XmlDeserializer<'a> {
    fn new(hint: Option<&'a dyn PropertyTypeHint>) -> Self {
        XmlDeserializer {
            dom: WeakDom::new(InstanceBuilder::new("DataModel")),
            referents: HashMap::new(),
            shared_strings: HashMap::new(),
            deferred_refs: Vec::new(),
            deferred_shared_strings: Vec::new(),
            warnings: Vec::new(),
            hint,
        }
    }

    fn set_property(&mut self, instance: Ref, class_name: &str, name: String, value: Variant) {
        let value = match self.hint.and_then(|hint| hint.hint(class_name, &name)) {
            Some(target) if target != value.ty() => core::coerce(value, target),
            _ => value,
        };

        let instance = self.dom.get_by_ref_mut(instance).expect("instance must exist");

        if name == "Name" {
            if let Variant::String(value) = value {
                instance.name = value;
            }
        } else {
            instance.properties.insert(name, value);
        }
    }

    fn deserialize_instance<R: Read>(&mut self, reader: &mut XmlEventReader<R>, parent: Ref) -> Result<(), DecodeError> {
        let attributes = reader.expect_start_with_name("Item")?;

        let class = attributes
            .iter()
            .find(|attr| attr.name.local_name == "class")
            .map(|attr| attr.value.clone())
            .ok_or_else(|| reader.error(DecodeErrorCause::MissingAttribute("class")))?;

        let referent = attributes
            .iter()
            .find(|attr| attr.name.local_name == "referent")
            .map(|attr| attr.value.clone());

        trace!("Item class={} referent={:?}", class, referent);

        let this_ref = self.dom.insert(parent, InstanceBuilder::new(class));

        if let Some(referent) = referent {
            self.referents.insert(referent, this_ref);
        }

        loop {
            match reader.expect_peek()? {
                XmlReadEvent::StartElement { name, .. } => match name.local_name.as_str() {
                    "Properties" => {
                        reader.expect_next()?;
                        self.deserialize_properties(reader, this_ref)?;
                    }
                    "Item" => self.deserialize_instance(reader, this_ref)?,
                    _ => reader.eat_unknown_tag()?,
                },
                XmlReadEvent::EndElement { name } if name.local_name == "Item" => {
                    reader.expect_next()?;
                    break;
                }
                _ => {
                    reader.expect_next()?;
                }
            }
        }

        Ok(())
    }

    fn deserialize_properties<R: Read>(&mut self, reader: &mut XmlEventReader<R>, instance: Ref) -> Result<(), DecodeError> {
        loop {
            match reader.expect_peek()? {
                XmlReadEvent::EndElement { name } if name.local_name == "Properties" => {
                    reader.expect_next()?;
                    break;
                }
                XmlReadEvent::StartElement { .. } => {
                    let (raw_tag, attributes) = match reader.expect_next()? {
                        XmlReadEvent::StartElement { name, attributes, .. } => (name.local_name, attributes),
                        _ => unreachable!(),
                    };

                    let prop_name = attributes
                        .iter()
                        .find(|attr| attr.name.local_name == "name")
                        .map(|attr| attr.value.clone())
                        .ok_or_else(|| reader.error(DecodeErrorCause::MissingAttribute("name")))?;

                    let normalized = types::normalize_tag_name(&raw_tag);
                    let class_name = self.dom.get_by_ref(instance).unwrap().class.clone();

                    match normalized.as_str() {
                        "ref" => {
                            let text = reader.read_characters()?;
                            reader.expect_end_with_name(&raw_tag)?;

                            if !is_empty_referent(&text) {
                                self.deferred_refs.push(DeferredRef {
                                    instance,
                                    class_name,
                                    prop_name,
                                    referent: text,
                                });
                            } else {
                                self.set_property(instance, &class_name, prop_name, Variant::Ref(Ref::none()));
                            }
                        }
                        "sharedstring" => {
                            let text = reader.read_characters()?;
                            reader.expect_end_with_name(&raw_tag)?;

                            self.deferred_shared_strings.push(DeferredSharedString {
                                instance,
                                class_name,
                                prop_name,
                                key: text,
                            });
                        }
                        other => {
                            let value = types::read_value_xml(reader, other)?;
                            reader.expect_end_with_name(&raw_tag)?;
                            self.set_property(instance, &class_name, prop_name, value);
                        }
                    }
                }
                _ => {
                    reader.expect_next()?;
                }
            }
        }

        Ok(())
    }

    fn deserialize_shared_strings<R: Read>(&mut self, reader: &mut XmlEventReader<R>) -> Result<(), DecodeError> {
        reader.expect_start_with_name("SharedStrings")?;

        loop {
            match reader.expect_peek()? {
                XmlReadEvent::EndElement { name } if name.local_name == "SharedStrings" => {
                    reader.expect_next()?;
                    break;
                }
                XmlReadEvent::StartElement { name, .. } if name.local_name == "SharedString" => {
                    let attributes = reader.expect_start_with_name("SharedString")?;
                    let key = attributes
                        .iter()
                        .find(|attr| attr.name.local_name == "md5")
                        .map(|attr| attr.value.clone())
                        .ok_or_else(|| reader.error(DecodeErrorCause::MissingAttribute("md5")))?;

                    let payload_base64 = reader.read_characters()?;
                    reader.expect_end_with_name("SharedString")?;

                    let payload = base64::decode(payload_base64.trim())
                        .map_err(|err| reader.error(DecodeErrorCause::Base64(err)))?;

                    self.shared_strings.insert(key, SharedString::new(payload));
                }
                _ => reader.eat_unknown_tag()?,
            }
        }

        Ok(())
    }

    fn resolve_deferred(&mut self) {
        for deferred in self.deferred_refs.drain(..) {
            let target = self.referents.get(&deferred.referent).copied();

            let value = match target {
                Some(target) => Variant::Ref(target),
                None => {
                    self.warnings.push(DecodeWarning::UnresolvedReference {
                        class_name: deferred.class_name,
                        prop_name: deferred.prop_name.clone(),
                        referent: deferred.referent,
                    });
                    Variant::Ref(Ref::none())
                }
            };

            if let Some(instance) = self.dom.get_by_ref_mut(deferred.instance) {
                instance.properties.insert(deferred.prop_name, value);
            }
        }

        for deferred in self.deferred_shared_strings.drain(..) {
            match self.shared_strings.get(&deferred.key).cloned() {
                Some(shared) => {
                    if let Some(instance) = self.dom.get_by_ref_mut(deferred.instance) {
                        instance.properties.insert(deferred.prop_name, Variant::SharedString(shared));
                    }
                }
                None => {
                    self.warnings.push(DecodeWarning::UnresolvedSharedString {
                        class_name: deferred.class_name,
                        prop_name: deferred.prop_name,
                        key: deferred.key,
                    });
                }
            }
        }
    }
}
