//! A device backed by a configuration document on disk.
//!
//! The candidate configuration is the document passed to
//! [`XmlDevice::open`]; every applied operation rewrites it in place.
//! Committing copies the candidate to the running configuration file.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use panos_xml::{parse_file, write_file, XmlNode};
use tracing::{debug, info, warn};

use crate::error::DeviceError;
use crate::object::codec;
use crate::object::instance::ConfigObject;
use crate::object::spec::{ObjectSpec, Placement};
use crate::session::{CommitReceipt, DeviceSession, Operation, Scope, SoftwareVersion};
use crate::snapshot::RemoteSnapshot;

/// Exclusive claim on a configuration file, released on drop.
#[derive(Debug)]
struct LockFile {
    path: PathBuf,
}

impl LockFile {
    fn acquire(config: &Path) -> Result<Self, DeviceError> {
        let path = sibling(config, ".lock");
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                debug!(lock = %path.display(), "acquired configuration lock");
                Ok(Self { path })
            }
            Err(err) if err.kind() == IoErrorKind::AlreadyExists => Err(DeviceError::Locked {
                path: path.display().to_string(),
            }),
            Err(source) => Err(DeviceError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), %err, "failed to release configuration lock");
        } else {
            debug!(lock = %self.path.display(), "released configuration lock");
        }
    }
}

#[derive(Debug)]
struct Backing {
    candidate: PathBuf,
    running: PathBuf,
    _lock: LockFile,
}

/// [`DeviceSession`] over a PAN-OS configuration document.
#[derive(Debug)]
pub struct XmlDevice {
    tree: XmlNode,
    version: Option<SoftwareVersion>,
    backing: Option<Backing>,
    running: Option<XmlNode>,
    commits: u64,
}

impl XmlDevice {
    /// Lock and load the configuration at `path`.
    ///
    /// Commits are written to `running`, or to `<stem>.running.xml` next to
    /// the candidate when not given.
    pub fn open(path: &Path, running: Option<PathBuf>) -> Result<Self, DeviceError> {
        let lock = LockFile::acquire(path)?;
        let tree = parse_file(path)?;
        let running = running.unwrap_or_else(|| default_running_path(path));
        info!(config = %path.display(), "opened device configuration");

        let mut device = Self::from_tree(tree);
        device.backing = Some(Backing {
            candidate: path.to_path_buf(),
            running,
            _lock: lock,
        });
        Ok(device)
    }

    /// An in-memory device; nothing is persisted.
    pub fn from_tree(tree: XmlNode) -> Self {
        let version = tree
            .attributes
            .get("version")
            .and_then(|raw| raw.parse::<SoftwareVersion>().ok());
        Self {
            tree,
            version,
            backing: None,
            running: None,
            commits: 0,
        }
    }

    /// The candidate configuration.
    pub fn candidate(&self) -> &XmlNode {
        &self.tree
    }

    /// The configuration of the last in-memory commit.
    pub fn running(&self) -> Option<&XmlNode> {
        self.running.as_ref()
    }

    fn scope_root(&self, scope: &Scope) -> Result<Option<&XmlNode>, DeviceError> {
        match scope.root_path().resolve(&self.tree) {
            Some(root) => Ok(Some(root)),
            None if *scope == Scope::Device => Ok(None),
            None => Err(DeviceError::MissingScope(scope.to_string())),
        }
    }

    fn scope_root_mut(&mut self, scope: &Scope) -> Result<&mut XmlNode, DeviceError> {
        let path = scope.root_path();
        let root = match scope {
            Scope::Device => path.ensure(&mut self.tree),
            _ => path.resolve_mut(&mut self.tree),
        };
        root.ok_or_else(|| DeviceError::MissingScope(scope.to_string()))
    }

    fn persist(&self) -> Result<(), DeviceError> {
        if let Some(backing) = &self.backing {
            write_file(&self.tree, &backing.candidate)?;
            debug!(config = %backing.candidate.display(), "saved candidate configuration");
        }
        Ok(())
    }
}

impl DeviceSession for XmlDevice {
    fn version(&self) -> Option<SoftwareVersion> {
        self.version
    }

    fn list(
        &mut self,
        spec: &'static ObjectSpec,
        scope: &Scope,
    ) -> Result<RemoteSnapshot, DeviceError> {
        let Some(root) = self.scope_root(scope)? else {
            return Ok(RemoteSnapshot::empty(spec));
        };

        let instances = match (spec.placement, root.descend(spec.placement.path())) {
            (_, None) => Vec::new(),
            (Placement::Entries(_), Some(container)) => container
                .entries()
                .map(|entry| codec::decode(spec, entry))
                .collect::<Result<Vec<_>, _>>()?,
            (Placement::Singleton(_), Some(element)) => vec![codec::decode(spec, element)?],
        };
        debug!(kind = %spec.kind, %scope, count = instances.len(), "listed objects");
        Ok(RemoteSnapshot::new(spec, instances))
    }

    fn apply(&mut self, scope: &Scope, op: &Operation) -> Result<(), DeviceError> {
        let obj = op.object();
        let root = self.scope_root_mut(scope)?;
        match op {
            Operation::Create(_) => create(root, obj)?,
            Operation::Update(_) => {
                let existing = locate_mut(root, obj).ok_or_else(|| missing(obj))?;
                codec::apply_onto(existing, obj);
            }
            Operation::Delete(_) => remove(root, obj)?,
        }
        info!(op = op.verb(), object = %describe(obj), %scope, "applied configuration change");
        self.persist()
    }

    fn commit(&mut self) -> Result<CommitReceipt, DeviceError> {
        match &self.backing {
            Some(backing) => {
                write_file(&self.tree, &backing.running)?;
                info!(running = %backing.running.display(), "committed configuration");
            }
            None => {
                self.running = Some(self.tree.clone());
                info!("committed configuration");
            }
        }
        self.commits += 1;
        Ok(CommitReceipt {
            job_id: self.commits,
        })
    }
}

fn create(root: &mut XmlNode, obj: &ConfigObject) -> Result<(), DeviceError> {
    let path = obj.spec().placement.path();
    match obj.spec().placement {
        Placement::Entries(_) => {
            let name = obj.name().ok_or_else(|| {
                DeviceError::Rejected(format!("{} requires a name", obj.kind()))
            })?;
            let container = root.ensure_path(path);
            if container.get_entry(name).is_some() {
                return Err(DeviceError::Rejected(format!(
                    "{} already exists",
                    describe(obj)
                )));
            }
            container.children.push(codec::encode(obj));
        }
        Placement::Singleton(_) => {
            if root.descend(path).is_some() {
                return Err(DeviceError::Rejected(format!(
                    "{} already exists",
                    describe(obj)
                )));
            }
            let parent = &path[..path.len().saturating_sub(1)];
            root.ensure_path(parent).children.push(codec::encode(obj));
        }
    }
    Ok(())
}

fn locate_mut<'a>(root: &'a mut XmlNode, obj: &ConfigObject) -> Option<&'a mut XmlNode> {
    let element = root.descend_mut(obj.spec().placement.path())?;
    match obj.spec().placement {
        Placement::Entries(_) => element.get_entry_mut(obj.name()?),
        Placement::Singleton(_) => Some(element),
    }
}

fn remove(root: &mut XmlNode, obj: &ConfigObject) -> Result<(), DeviceError> {
    let path = obj.spec().placement.path();
    let removed = match obj.spec().placement {
        Placement::Entries(_) => obj
            .name()
            .and_then(|name| root.descend_mut(path)?.remove_entry(name)),
        Placement::Singleton(_) => path.split_last().and_then(|(leaf, parent)| {
            let parent = root.descend_mut(parent)?;
            let idx = parent.children.iter().position(|c| c.tag == *leaf)?;
            Some(parent.children.remove(idx))
        }),
    };
    removed.map(|_| ()).ok_or_else(|| missing(obj))
}

fn missing(obj: &ConfigObject) -> DeviceError {
    DeviceError::Rejected(format!("{} does not exist", describe(obj)))
}

fn describe(obj: &ConfigObject) -> String {
    match obj.name() {
        Some(name) => format!("{} '{}'", obj.kind(), name),
        None => obj.kind().to_string(),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn default_running_path(candidate: &Path) -> PathBuf {
    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    candidate.with_file_name(format!("{stem}.running.xml"))
}
