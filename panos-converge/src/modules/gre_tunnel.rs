//! GRE tunnels (`network/tunnel/gre`).

use crate::modules::ModuleDef;
use crate::object::instance::ConfigObject;
use crate::object::spec::{FieldSpec, ObjectKind, ObjectSpec, Placement};
use crate::params::ParameterSet;
use crate::schema::{Binding, Choices, DefaultValue, OptionSpec, State};
use crate::session::SoftwareVersion;
use crate::value::ParamType::{Bool, Int, Str};

pub static GRE_TUNNEL: ObjectSpec = ObjectSpec {
    kind: ObjectKind::GreTunnel,
    placement: Placement::Entries(&["network", "tunnel", "gre"]),
    fields: &[
        FieldSpec { name: "interface", ty: Str, path: &["interface"] },
        FieldSpec { name: "local_address_type", ty: Str, path: &["local-address", "type"] },
        FieldSpec { name: "local_address_value", ty: Str, path: &["local-address", "value"] },
        FieldSpec { name: "peer_address", ty: Str, path: &["peer-address"] },
        FieldSpec { name: "tunnel_interface", ty: Str, path: &["tunnel-interface"] },
        FieldSpec { name: "ttl", ty: Int, path: &["ttl"] },
        FieldSpec { name: "copy_tos", ty: Bool, path: &["copy-tos"] },
        FieldSpec { name: "enable_keep_alive", ty: Bool, path: &["keep-alive", "enable"] },
        FieldSpec { name: "keep_alive_interval", ty: Int, path: &["keep-alive", "interval"] },
        FieldSpec { name: "keep_alive_retry", ty: Int, path: &["keep-alive", "retry"] },
        FieldSpec { name: "keep_alive_hold_timer", ty: Int, path: &["keep-alive", "hold-timer"] },
        FieldSpec { name: "disabled", ty: Bool, path: &["disabled"] },
    ],
    slots: &[],
    unreliable_fields: &[],
};

const OPTIONS: &[OptionSpec] = &[
    OptionSpec::new("name", Str, "Name of the tunnel.").required(),
    OptionSpec::new("interface", Str, "Interface to terminate the tunnel."),
    OptionSpec::new("local_address_type", Str, "Type of local address.")
        .default_value(DefaultValue::Str("ip"))
        .choices(Choices::Str(&["ip", "floating-ip"])),
    OptionSpec::new("local_address_value", Str, "IP address value."),
    OptionSpec::new("peer_address", Str, "Peer IP address."),
    OptionSpec::new("tunnel_interface", Str, "Tunnel interface the tunnel is bound to."),
    OptionSpec::new("ttl", Int, "TTL.")
        .default_value(DefaultValue::Int(64))
        .range(1, 255),
    OptionSpec::new("copy_tos", Bool, "Copy IP TOS bits from inner packet to GRE packet."),
    OptionSpec::new("enable_keep_alive", Bool, "Enable tunnel monitoring."),
    OptionSpec::new("keep_alive_interval", Int, "Keep alive interval.")
        .default_value(DefaultValue::Int(10)),
    OptionSpec::new("keep_alive_retry", Int, "Keep alive retry time.")
        .default_value(DefaultValue::Int(3)),
    OptionSpec::new("keep_alive_hold_timer", Int, "Keep alive hold timer.")
        .default_value(DefaultValue::Int(5)),
    OptionSpec::new("disabled", Bool, "Disable the GRE tunnel."),
];

const BINDINGS: &[Binding] = &[
    Binding::identity("name"),
    Binding::root("interface", "interface"),
    Binding::root("local_address_type", "local_address_type"),
    Binding::root("local_address_value", "local_address_value"),
    Binding::root("peer_address", "peer_address"),
    Binding::root("tunnel_interface", "tunnel_interface"),
    Binding::root("ttl", "ttl"),
    Binding::root("copy_tos", "copy_tos"),
    Binding::root("enable_keep_alive", "enable_keep_alive"),
    Binding::root("keep_alive_interval", "keep_alive_interval"),
    Binding::root("keep_alive_retry", "keep_alive_retry"),
    Binding::root("keep_alive_hold_timer", "keep_alive_hold_timer"),
    Binding::root("disabled", "disabled"),
];

inventory::submit! {
    ModuleDef {
        name: "gre_tunnel",
        summary: "Manage GRE tunnels.",
        root: &GRE_TUNNEL,
        options: OPTIONS,
        bindings: BINDINGS,
        states: &[
            State::Present,
            State::Absent,
            State::Merged,
            State::Replaced,
            State::Deleted,
            State::Gathered,
        ],
        default_state: State::Present,
        gathered_filter: true,
        min_version: Some(SoftwareVersion::new(9, 0, 0)),
    }
}

pub fn build_gre_tunnel(fields: &ParameterSet) -> ConfigObject {
    let mut tunnel = ConfigObject::new(&GRE_TUNNEL);
    tunnel.set("interface", fields.get("interface").clone());
    tunnel.set("local_address_type", fields.get("local_address_type").clone());
    tunnel.set("local_address_value", fields.get("local_address_value").clone());
    tunnel.set("peer_address", fields.get("peer_address").clone());
    tunnel.set("tunnel_interface", fields.get("tunnel_interface").clone());
    tunnel.set("ttl", fields.get("ttl").clone());
    tunnel.set("copy_tos", fields.get("copy_tos").clone());
    tunnel.set("enable_keep_alive", fields.get("enable_keep_alive").clone());
    tunnel.set("keep_alive_interval", fields.get("keep_alive_interval").clone());
    tunnel.set("keep_alive_retry", fields.get("keep_alive_retry").clone());
    tunnel.set("keep_alive_hold_timer", fields.get("keep_alive_hold_timer").clone());
    tunnel.set("disabled", fields.get("disabled").clone());
    tunnel
}
