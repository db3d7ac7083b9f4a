use crate::object::spec::{ObjectKind, ObjectSpec};
use crate::value::Value;

/// A child slot of a [`ConfigObject`].
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Absent,
    Present(Box<ConfigObject>),
}

impl Slot {
    pub fn as_object(&self) -> Option<&ConfigObject> {
        match self {
            Slot::Absent => None,
            Slot::Present(obj) => Some(obj),
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Slot::Present(_))
    }
}

/// A concrete configuration object: identity, one value per declared field,
/// and one [`Slot`] per declared child slot, in declaration order.
#[derive(Debug, Clone)]
pub struct ConfigObject {
    spec: &'static ObjectSpec,
    name: Option<String>,
    fields: Vec<(&'static str, Value)>,
    slots: Vec<(&'static str, Slot)>,
}

impl ConfigObject {
    /// An object with every field unset and every slot absent.
    pub fn new(spec: &'static ObjectSpec) -> Self {
        Self {
            spec,
            name: None,
            fields: spec.fields.iter().map(|f| (f.name, Value::Absent)).collect(),
            slots: spec.slots.iter().map(|s| (s.name, Slot::Absent)).collect(),
        }
    }

    pub fn named(spec: &'static ObjectSpec, name: impl Into<String>) -> Self {
        let mut obj = Self::new(spec);
        obj.name = Some(name.into());
        obj
    }

    pub fn spec(&self) -> &'static ObjectSpec {
        self.spec
    }

    pub fn kind(&self) -> ObjectKind {
        self.spec.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Field value; undeclared names read as absent.
    pub fn get(&self, field: &str) -> &Value {
        const ABSENT: &Value = &Value::Absent;
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, v)| v)
            .unwrap_or(ABSENT)
    }

    /// Assign a declared field.
    pub fn set(&mut self, field: &str, value: Value) {
        let slot = self.fields.iter_mut().find(|(name, _)| *name == field);
        debug_assert!(slot.is_some(), "{} has no field {field}", self.spec.kind);
        if let Some((_, current)) = slot {
            *current = value;
        }
    }

    /// Builder-style [`ConfigObject::set`].
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set(field, value.into());
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(name, v)| (*name, v))
    }

    pub fn slot(&self, name: &str) -> &Slot {
        const ABSENT: &Slot = &Slot::Absent;
        self.slots
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, s)| s)
            .unwrap_or(ABSENT)
    }

    pub fn child(&self, name: &str) -> Option<&ConfigObject> {
        self.slot(name).as_object()
    }

    /// Fill a declared slot.
    pub fn set_slot(&mut self, name: &str, value: Slot) {
        let slot = self.slots.iter_mut().find(|(slot, _)| *slot == name);
        debug_assert!(slot.is_some(), "{} has no slot {name}", self.spec.kind);
        if let Some((_, current)) = slot {
            *current = value;
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = (&'static str, &Slot)> {
        self.slots.iter().map(|(name, s)| (*name, s))
    }

    /// True when no field is set and no slot is present.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_absent())
            && self.slots.iter().all(|(_, s)| !s.is_present())
    }

    /// Field-level patch: every set field and present slot of `patch` is
    /// written onto `self`, everything else is kept.
    pub fn overlay(&mut self, patch: &ConfigObject) {
        for (name, value) in patch.fields() {
            if value.is_set() {
                self.set(name, value.clone());
            }
        }
        for (name, slot) in patch.slots() {
            let Slot::Present(child_patch) = slot else {
                continue;
            };
            match self.slots.iter_mut().find(|(slot, _)| *slot == name) {
                Some((_, Slot::Present(existing))) => existing.overlay(child_patch),
                Some((_, current)) => *current = Slot::Present(child_patch.clone()),
                None => {}
            }
        }
    }

    /// Copy the listed fields from `source` onto `self`.
    pub fn copy_fields_from(&mut self, source: &ConfigObject, fields: &[&str]) {
        for field in fields {
            self.set(field, source.get(field).clone());
        }
    }
}

impl PartialEq for ConfigObject {
    fn eq(&self, other: &Self) -> bool {
        self.spec.kind == other.spec.kind
            && self.name == other.name
            && self.fields == other.fields
            && self.slots == other.slots
    }
}
