//! Declarative convergence of PAN-OS configuration objects.
//!
//! A module (GRE tunnel, high availability) takes a flat set of typed
//! options and drives the device's configuration to the state they
//! describe. Every module runs the same pipeline:
//!
//! 1. [`schema`] validates options: types, choices, ranges, required
//!    options, scope conflicts.
//! 2. [`mapper`] splits them into per-object field maps using the module's
//!    explicit binding table.
//! 3. [`builder`] builds the desired object tree. Child objects exist only
//!    when one of their options was given.
//! 4. [`reconcile`] lists the device once, normalizes fields the device does
//!    not report reliably, and creates, updates, deletes, or leaves the
//!    object alone.
//! 5. [`runner`] commits when requested and something changed, and produces
//!    the [`result::ModuleResult`].
//!
//! The device is reached only through [`session::DeviceSession`].
//! [`session::XmlDevice`] implements it over a configuration document on
//! disk.
//!
//! # Examples
//!
//! ```ignore
//! use panos_converge::invocation::{run, ExecuteOptions};
//! use panos_converge::params::ParameterSet;
//! use panos_converge::session::XmlDevice;
//!
//! let mut device = XmlDevice::open("fw.xml".as_ref(), None)?;
//! let params = ParameterSet::new().with("name", "t1").with("ttl", 42);
//! let result = run("gre_tunnel", &params, &mut device, ExecuteOptions::default())?;
//! println!("changed={}", result.changed);
//! ```

pub mod builder;
pub mod config;
pub mod diff;
pub mod error;
pub mod gather_filter;
pub mod invocation;
pub mod mapper;
pub mod modules;
pub mod object;
pub mod params;
pub mod reconcile;
pub mod report;
pub mod result;
pub mod runner;
pub mod schema;
pub mod session;
pub mod snapshot;
pub mod value;
