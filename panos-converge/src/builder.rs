//! Object Tree Builder.
//!
//! Turns a [`Partition`] into the desired object tree. A child slot is
//! present only when at least one of its fields was given; a present child
//! carries every one of its fields, unset ones explicitly absent.

use tracing::debug;

use crate::mapper::Partition;
use crate::modules::{gre_tunnel, ha, ModuleDef};
use crate::object::{ConfigObject, ObjectKind, Slot};
use crate::params::ParameterSet;

/// Builds one object from its field map.
pub type BuildFn = fn(&ParameterSet) -> ConfigObject;

pub fn builder_for(kind: ObjectKind) -> BuildFn {
    match kind {
        ObjectKind::GreTunnel => gre_tunnel::build_gre_tunnel,
        ObjectKind::HighAvailability => ha::build_high_availability,
        ObjectKind::Ha1 => ha::build_ha1,
        ObjectKind::Ha1Backup => ha::build_ha1_backup,
        ObjectKind::Ha2 => ha::build_ha2,
        ObjectKind::Ha2Backup => ha::build_ha2_backup,
        ObjectKind::Ha3 => ha::build_ha3,
    }
}

/// A fully built desired object, ready for reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredTree {
    root: ConfigObject,
}

impl DesiredTree {
    pub fn new(root: ConfigObject) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ConfigObject {
        &self.root
    }

    pub fn into_root(self) -> ConfigObject {
        self.root
    }
}

pub fn build_tree(module: &ModuleDef, partition: &Partition) -> DesiredTree {
    let spec = module.root;
    let mut root = builder_for(spec.kind)(&partition.root);
    if spec.is_named() {
        root.set_name(partition.identity.clone());
    }

    for slot in spec.slots {
        let value = match partition.slot(slot.name) {
            Some(fields) if fields.iter().any(|(_, v)| v.is_set()) => {
                Slot::Present(Box::new(builder_for(slot.object.kind)(fields)))
            }
            _ => Slot::Absent,
        };
        root.set_slot(slot.name, value);
    }

    debug!(
        kind = %spec.kind,
        name = root.name().unwrap_or_default(),
        "built desired tree"
    );
    DesiredTree::new(root)
}
