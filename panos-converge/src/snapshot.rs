use tracing::debug;

use crate::object::instance::ConfigObject;
use crate::object::spec::ObjectSpec;

/// Instances of one object kind read from one scope.
#[derive(Debug, Clone)]
pub struct RemoteSnapshot {
    pub spec: &'static ObjectSpec,
    pub instances: Vec<ConfigObject>,
}

impl RemoteSnapshot {
    pub fn new(spec: &'static ObjectSpec, instances: Vec<ConfigObject>) -> Self {
        Self { spec, instances }
    }

    pub fn empty(spec: &'static ObjectSpec) -> Self {
        Self::new(spec, Vec::new())
    }

    fn position(&self, desired: &ConfigObject) -> Option<usize> {
        if self.spec.is_named() {
            self.instances
                .iter()
                .position(|obj| obj.name().is_some() && obj.name() == desired.name())
        } else if self.instances.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// The instance `desired` identifies: same name for entry objects, the
    /// only instance for singletons.
    pub fn find(&self, desired: &ConfigObject) -> Option<&ConfigObject> {
        self.position(desired).map(|idx| &self.instances[idx])
    }

    /// Make fields the device does not report reliably compare equal.
    ///
    /// The matching instance takes the desired value of each field listed in
    /// the object's `unreliable_fields`. Every other field is left verbatim.
    pub fn normalize(&mut self, desired: &ConfigObject) {
        let fields = self.spec.unreliable_fields;
        if fields.is_empty() {
            return;
        }
        if let Some(idx) = self.position(desired) {
            debug!(kind = %self.spec.kind, ?fields, "normalizing unreliable fields");
            self.instances[idx].copy_fields_from(desired, fields);
        }
    }
}
