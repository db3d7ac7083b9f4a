//! XML primitives for PAN-OS style device configuration documents.
//!
//! A device configuration is a single XML tree. Repeated objects live in
//! `<entry name="...">` elements, so besides parsing and writing this crate
//! knows how to address a node by a path of plain tags and named entries.

pub mod parser;
pub mod path;
pub mod tree;
pub mod writer;

pub use parser::{parse, parse_file, ParseError};
pub use path::{Step, XmlPath};
pub use tree::XmlNode;
pub use writer::{render_fragment, write, write_file, WriteError};
