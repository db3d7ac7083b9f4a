use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::value::ParamType;

/// Every configuration object type the engine knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ObjectKind {
    GreTunnel,
    HighAvailability,
    Ha1,
    Ha1Backup,
    Ha2,
    Ha2Backup,
    Ha3,
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::GreTunnel => "GreTunnel",
            ObjectKind::HighAvailability => "HighAvailability",
            ObjectKind::Ha1 => "HA1",
            ObjectKind::Ha1Backup => "HA1Backup",
            ObjectKind::Ha2 => "HA2",
            ObjectKind::Ha2Backup => "HA2Backup",
            ObjectKind::Ha3 => "HA3",
        };
        f.write_str(name)
    }
}

/// Where instances of an object live relative to their parent element.
///
/// For root objects the parent is the scope root, for child slots it is the
/// parent object's element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Named `<entry>` members of the container at this path.
    Entries(&'static [&'static str]),
    /// Exactly one element at this path.
    Singleton(&'static [&'static str]),
}

impl Placement {
    pub fn path(&self) -> &'static [&'static str] {
        match self {
            Placement::Entries(path) | Placement::Singleton(path) => path,
        }
    }
}

/// One typed field and the element that stores it, relative to the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub path: &'static [&'static str],
}

/// A named child-object slot.
#[derive(Debug, Clone, Copy)]
pub struct SlotSpec {
    pub name: &'static str,
    pub object: &'static ObjectSpec,
}

/// Schema of one node in the device's configuration hierarchy.
#[derive(Debug)]
pub struct ObjectSpec {
    pub kind: ObjectKind,
    pub placement: Placement,
    pub fields: &'static [FieldSpec],
    pub slots: &'static [SlotSpec],
    /// Fields the device listing does not report reliably; see
    /// [`crate::snapshot::RemoteSnapshot::normalize`].
    pub unreliable_fields: &'static [&'static str],
}

impl ObjectSpec {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn slot(&self, name: &str) -> Option<&'static SlotSpec> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// Named objects are identified by their `entry` name, singletons by
    /// their position.
    pub fn is_named(&self) -> bool {
        matches!(self.placement, Placement::Entries(_))
    }

    /// Tag of the element holding one instance.
    pub fn element_tag(&self) -> &'static str {
        match self.placement {
            Placement::Entries(_) => panos_xml::tree::ENTRY_TAG,
            Placement::Singleton(path) => path.last().copied().unwrap_or("object"),
        }
    }
}
