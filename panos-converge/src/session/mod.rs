//! The device-side collaborator of the reconciler.
//!
//! Everything the engine needs from a firewall goes through
//! [`DeviceSession`]: one listing per invocation, one configuration
//! operation, and an optional commit. [`XmlDevice`] implements it on top of a
//! configuration document stored on disk.

use std::fmt::{self, Display, Formatter};

use panos_xml::XmlPath;

use crate::error::DeviceError;
use crate::object::instance::ConfigObject;
use crate::object::spec::ObjectSpec;
use crate::snapshot::RemoteSnapshot;

pub mod version;
pub mod xml_device;

pub use version::SoftwareVersion;
pub use xml_device::XmlDevice;

/// Name of the single vsys-less device entry every PAN-OS config carries.
pub const LOCAL_DEVICE: &str = "localhost.localdomain";

/// Where in the configuration hierarchy an invocation operates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Device,
    Template(String),
    TemplateStack(String),
}

impl Scope {
    /// Path of the device entry that object placements are relative to.
    pub fn root_path(&self) -> XmlPath {
        let config = XmlPath::root("config").tag("devices").entry(LOCAL_DEVICE);
        match self {
            Scope::Device => config,
            Scope::Template(name) => config
                .tag("template")
                .entry(name)
                .tag("config")
                .tag("devices")
                .entry(LOCAL_DEVICE),
            Scope::TemplateStack(name) => config
                .tag("template-stack")
                .entry(name)
                .tag("config")
                .tag("devices")
                .entry(LOCAL_DEVICE),
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Device => f.write_str("device"),
            Scope::Template(name) => write!(f, "template '{name}'"),
            Scope::TemplateStack(name) => write!(f, "template stack '{name}'"),
        }
    }
}

/// The single configuration change a reconciliation performs.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Create(ConfigObject),
    Update(ConfigObject),
    Delete(ConfigObject),
}

impl Operation {
    pub fn object(&self) -> &ConfigObject {
        match self {
            Operation::Create(obj) | Operation::Update(obj) | Operation::Delete(obj) => obj,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Operation::Create(_) => "create",
            Operation::Update(_) => "update",
            Operation::Delete(_) => "delete",
        }
    }
}

/// Acknowledgement of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub job_id: u64,
}

/// Live connection to a device.
pub trait DeviceSession {
    /// Software version, resolved once when the session was set up.
    fn version(&self) -> Option<SoftwareVersion>;

    /// Read every instance of `spec` in `scope`.
    fn list(&mut self, spec: &'static ObjectSpec, scope: &Scope)
        -> Result<RemoteSnapshot, DeviceError>;

    /// Perform one configuration change on the candidate configuration.
    fn apply(&mut self, scope: &Scope, op: &Operation) -> Result<(), DeviceError>;

    /// Promote the candidate configuration to running.
    fn commit(&mut self) -> Result<CommitReceipt, DeviceError>;
}

#[cfg(test)]
mod tests {
    use super::Scope;

    #[test]
    fn template_scopes_nest_under_the_device_entry() {
        assert_eq!(
            Scope::Device.root_path().to_string(),
            "/config/devices/entry[@name='localhost.localdomain']"
        );
        assert_eq!(
            Scope::Template("branch".into()).root_path().to_string(),
            "/config/devices/entry[@name='localhost.localdomain']/template/entry[@name='branch']\
             /config/devices/entry[@name='localhost.localdomain']"
        );
        assert!(Scope::TemplateStack("all".into())
            .root_path()
            .to_string()
            .contains("/template-stack/entry[@name='all']/"));
    }
}
