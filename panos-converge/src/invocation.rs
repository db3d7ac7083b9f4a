//! One module invocation, end to end.
//!
//! [`prepare`] is pure: it validates the options and builds every desired
//! tree before a session exists. [`execute`] then talks to the device.

use tracing::info;

use crate::builder::{build_tree, DesiredTree};
use crate::error::{ConvergeError, ConvergeResult, SchemaError};
use crate::gather_filter::GatherQuery;
use crate::mapper::partition;
use crate::modules::{find_module, ModuleDef};
use crate::params::ParameterSet;
use crate::reconcile::{Intent, Reconciler};
use crate::result::ModuleResult;
use crate::runner::{finalize, CommitRequest};
use crate::schema::{validate, State, Validated};
use crate::session::DeviceSession;

/// A validated invocation with its desired state fully built.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub module: &'static ModuleDef,
    pub validated: Validated,
    pub intent: Intent,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    pub check_mode: bool,
}

pub fn prepare(module: &'static ModuleDef, raw: &ParameterSet) -> Result<Prepared, SchemaError> {
    let validated = validate(module, raw)?;
    let build = |params: &ParameterSet| -> DesiredTree { build_tree(module, &partition(module, params)) };

    let intent = match validated.state {
        State::Present | State::Replaced => Intent::Replace(build(&validated.params)),
        State::Merged => Intent::Merge {
            patch: build(&validated.explicit_only()),
            create: build(&validated.params),
        },
        State::Absent | State::Deleted => Intent::Delete(build(&validated.params)),
        State::Gathered => Intent::Gather(GatherQuery::from_options(
            validated.gathered_filter.as_deref(),
            validated.params.get("name").as_str(),
            module.root,
        )?),
    };

    Ok(Prepared {
        module,
        validated,
        intent,
    })
}

pub fn execute(
    prepared: Prepared,
    session: &mut dyn DeviceSession,
    opts: ExecuteOptions,
) -> ConvergeResult<ModuleResult> {
    let Prepared {
        module,
        validated,
        intent,
    } = prepared;

    if let Some(min) = module.min_version {
        match session.version() {
            Some(version) if version >= min => {}
            Some(version) => {
                return Err(ConvergeError::Session(format!(
                    "{} requires PAN-OS {min} or newer, device runs {version}",
                    module.name
                )));
            }
            None => {
                return Err(ConvergeError::Session(format!(
                    "{} requires PAN-OS {min} or newer, device version is unknown",
                    module.name
                )));
            }
        }
    }

    info!(
        module = module.name,
        state = %validated.state,
        scope = %validated.scope,
        check_mode = opts.check_mode,
        "reconciling"
    );
    let outcome = Reconciler::new(opts.check_mode).reconcile(
        session,
        module.root,
        &validated.scope,
        intent,
    )?;

    let request = CommitRequest {
        commit: validated.commit,
        check_mode: opts.check_mode,
    };
    Ok(finalize(session, module, outcome, request))
}

/// Look up `module` by name, then [`prepare`] and [`execute`].
pub fn run(
    module: &str,
    raw: &ParameterSet,
    session: &mut dyn DeviceSession,
    opts: ExecuteOptions,
) -> ConvergeResult<ModuleResult> {
    let module =
        find_module(module).ok_or_else(|| SchemaError::UnknownModule(module.to_string()))?;
    execute(prepare(module, raw)?, session, opts)
}

#[cfg(test)]
mod tests {
    use panos_xml::parse;

    use super::{prepare, run, ExecuteOptions};
    use crate::error::ErrorKind;
    use crate::modules::find_module;
    use crate::params::ParameterSet;
    use crate::reconcile::Intent;
    use crate::session::XmlDevice;

    fn device(version: &str) -> XmlDevice {
        let xml = format!(
            r#"<config version="{version}"><devices><entry name="localhost.localdomain"/></devices></config>"#
        );
        XmlDevice::from_tree(parse(xml.as_bytes()).expect("parse"))
    }

    #[test]
    fn merged_state_builds_patch_from_explicit_options_only() {
        let gre = find_module("gre_tunnel").expect("gre");
        let raw = ParameterSet::new()
            .with("name", "t1")
            .with("ttl", 32)
            .with("state", "merged");
        let prepared = prepare(gre, &raw).expect("prepare");

        let Intent::Merge { patch, create } = prepared.intent else {
            panic!("expected merge intent");
        };
        assert!(patch.root().get("keep_alive_interval").is_absent());
        assert_eq!(create.root().get("keep_alive_interval").as_int(), Some(10));
    }

    #[test]
    fn old_software_is_a_session_error() {
        let raw = ParameterSet::new().with("name", "t1");
        let err = run("gre_tunnel", &raw, &mut device("8.1.0"), ExecuteOptions::default())
            .expect_err("too old");
        assert_eq!(err.kind(), ErrorKind::SessionError);
    }

    #[test]
    fn unknown_module_is_a_schema_error() {
        let err = run("vlan", &ParameterSet::new(), &mut device("10.0.0"), ExecuteOptions::default())
            .expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::SchemaError);
    }

    #[test]
    fn second_run_is_idempotent() {
        let mut dev = device("10.1.0");
        let raw = ParameterSet::new()
            .with("name", "t1")
            .with("interface", "ethernet1/5")
            .with("enable_keep_alive", true);

        let first = run("gre_tunnel", &raw, &mut dev, ExecuteOptions::default()).expect("first");
        let second = run("gre_tunnel", &raw, &mut dev, ExecuteOptions::default()).expect("second");
        assert!(first.changed);
        assert!(!second.changed);
    }
}
