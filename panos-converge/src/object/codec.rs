//! Translation between [`ConfigObject`]s and device configuration XML.
//!
//! Strings are stored as element text, integers in decimal, booleans as
//! `yes`/`no`. Unset fields and absent slots have no element at all.

use panos_xml::XmlNode;

use crate::error::DeviceError;
use crate::object::instance::{ConfigObject, Slot};
use crate::object::spec::{FieldSpec, ObjectSpec, Placement};
use crate::value::{ParamType, Value};

/// Build the element for one object, including its present children.
pub fn encode(obj: &ConfigObject) -> XmlNode {
    let spec = obj.spec();
    let mut node = match (spec.placement, obj.name()) {
        (Placement::Entries(_), Some(name)) => XmlNode::entry(name),
        _ => XmlNode::new(spec.element_tag()),
    };
    write_body(&mut node, obj);
    node
}

/// Read one object from its element.
///
/// Elements the schema does not model are ignored.
pub fn decode(spec: &'static ObjectSpec, node: &XmlNode) -> Result<ConfigObject, DeviceError> {
    let mut obj = ConfigObject::new(spec);
    if spec.is_named() {
        obj.set_name(node.entry_name().map(ToString::to_string));
    }

    for field in spec.fields {
        if let Some(element) = node.descend(field.path) {
            obj.set(field.name, decode_value(spec, field, element)?);
        }
    }

    for slot in spec.slots {
        if let Some(element) = node.descend(slot.object.placement.path()) {
            let child = decode(slot.object, element)?;
            obj.set_slot(slot.name, Slot::Present(Box::new(child)));
        }
    }

    Ok(obj)
}

/// Replace the modeled content of `existing` with `obj`.
///
/// Every modeled field and every modeled child slot is rewritten, so fields
/// unset in `obj` and slots absent from it are removed from the device.
/// Elements outside the schema are left where they are.
pub fn apply_onto(existing: &mut XmlNode, obj: &ConfigObject) {
    clear_modeled(existing, obj.spec());
    write_body(existing, obj);
}

fn clear_modeled(node: &mut XmlNode, spec: &ObjectSpec) {
    for field in spec.fields {
        node.remove_path(field.path);
    }
    for slot in spec.slots {
        node.remove_path(slot.object.placement.path());
    }
}

fn write_body(node: &mut XmlNode, obj: &ConfigObject) {
    let spec = obj.spec();
    for field in spec.fields {
        if let Some(text) = encode_value(obj.get(field.name)) {
            node.set_text_at(field.path, text);
        }
    }
    for (name, slot) in obj.slots() {
        let (Slot::Present(child), Some(slot_spec)) = (slot, spec.slot(name)) else {
            continue;
        };
        let element = node.ensure_path(slot_spec.object.placement.path());
        write_body(element, child);
    }
}

fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Absent => None,
        Value::Str(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Bool(true) => Some("yes".to_string()),
        Value::Bool(false) => Some("no".to_string()),
    }
}

fn decode_value(
    spec: &ObjectSpec,
    field: &FieldSpec,
    element: &XmlNode,
) -> Result<Value, DeviceError> {
    let Some(text) = element.text.as_deref() else {
        return Ok(Value::Absent);
    };
    let fail = |message: String| DeviceError::Decode {
        kind: spec.kind.to_string(),
        field: field.name.to_string(),
        message,
    };

    // Strings round-trip verbatim; only parsed scalars tolerate padding.
    match (field.ty, text.trim()) {
        (ParamType::Str, _) => Ok(Value::str(text)),
        (ParamType::Int, trimmed) => trimmed
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| fail(format!("expected an integer, found {text:?}"))),
        (ParamType::Bool, "yes") => Ok(Value::Bool(true)),
        (ParamType::Bool, "no") => Ok(Value::Bool(false)),
        (ParamType::Bool, _) => Err(fail(format!("expected yes/no, found {text:?}"))),
    }
}
