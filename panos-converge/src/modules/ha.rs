//! High availability (`deviceconfig/high-availability`).
//!
//! The HA configuration is a singleton with up to five interface children
//! (HA1, HA1 backup, HA2, HA2 backup, HA3). A child is only configured when
//! at least one of its options is given.

use crate::modules::ModuleDef;
use crate::object::instance::ConfigObject;
use crate::object::spec::{FieldSpec, ObjectKind, ObjectSpec, Placement, SlotSpec};
use crate::params::ParameterSet;
use crate::schema::{Binding, Choices, DefaultValue, OptionSpec, State};
use crate::value::ParamType::{Bool, Int, Str};

const INTERFACE_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "ip_address", ty: Str, path: &["ip-address"] },
    FieldSpec { name: "netmask", ty: Str, path: &["netmask"] },
    FieldSpec { name: "port", ty: Str, path: &["port"] },
    FieldSpec { name: "gateway", ty: Str, path: &["gateway"] },
];

pub static HA1: ObjectSpec = ObjectSpec {
    kind: ObjectKind::Ha1,
    placement: Placement::Singleton(&["interface", "ha1"]),
    fields: INTERFACE_FIELDS,
    slots: &[],
    unreliable_fields: &[],
};

pub static HA1_BACKUP: ObjectSpec = ObjectSpec {
    kind: ObjectKind::Ha1Backup,
    placement: Placement::Singleton(&["interface", "ha1-backup"]),
    fields: INTERFACE_FIELDS,
    slots: &[],
    unreliable_fields: &[],
};

pub static HA2: ObjectSpec = ObjectSpec {
    kind: ObjectKind::Ha2,
    placement: Placement::Singleton(&["interface", "ha2"]),
    fields: INTERFACE_FIELDS,
    slots: &[],
    unreliable_fields: &[],
};

pub static HA2_BACKUP: ObjectSpec = ObjectSpec {
    kind: ObjectKind::Ha2Backup,
    placement: Placement::Singleton(&["interface", "ha2-backup"]),
    fields: INTERFACE_FIELDS,
    slots: &[],
    unreliable_fields: &[],
};

pub static HA3: ObjectSpec = ObjectSpec {
    kind: ObjectKind::Ha3,
    placement: Placement::Singleton(&["interface", "ha3"]),
    fields: &[FieldSpec { name: "port", ty: Str, path: &["port"] }],
    slots: &[],
    unreliable_fields: &[],
};

pub static HIGH_AVAILABILITY: ObjectSpec = ObjectSpec {
    kind: ObjectKind::HighAvailability,
    placement: Placement::Singleton(&["deviceconfig", "high-availability"]),
    fields: &[
        FieldSpec { name: "enabled", ty: Bool, path: &["enabled"] },
        FieldSpec { name: "group_id", ty: Int, path: &["group", "group-id"] },
        FieldSpec {
            name: "config_sync",
            ty: Bool,
            path: &["group", "configuration-synchronization", "enabled"],
        },
        FieldSpec { name: "peer_ip", ty: Str, path: &["group", "peer-ip"] },
        FieldSpec { name: "peer_ip_backup", ty: Str, path: &["group", "peer-ip-backup"] },
        FieldSpec { name: "mode", ty: Str, path: &["group", "mode"] },
        FieldSpec {
            name: "passive_link_state",
            ty: Str,
            path: &["group", "active-passive", "passive-link-state"],
        },
        FieldSpec {
            name: "state_sync",
            ty: Bool,
            path: &["group", "state-synchronization", "enabled"],
        },
        FieldSpec {
            name: "ha2_keepalive",
            ty: Bool,
            path: &["group", "state-synchronization", "ha2-keep-alive", "enabled"],
        },
        FieldSpec {
            name: "ha2_keepalive_action",
            ty: Str,
            path: &["group", "state-synchronization", "ha2-keep-alive", "action"],
        },
        FieldSpec {
            name: "ha2_keepalive_threshold",
            ty: Int,
            path: &["group", "state-synchronization", "ha2-keep-alive", "threshold"],
        },
        FieldSpec {
            name: "device_id",
            ty: Int,
            path: &["group", "active-active", "device-id"],
        },
        FieldSpec {
            name: "session_owner_selection",
            ty: Str,
            path: &["group", "active-active", "session-owner-selection"],
        },
        FieldSpec {
            name: "session_setup",
            ty: Str,
            path: &["group", "active-active", "session-setup"],
        },
        FieldSpec {
            name: "tentative_hold_time",
            ty: Int,
            path: &["group", "active-active", "tentative-hold-time"],
        },
        FieldSpec {
            name: "sync_qos",
            ty: Bool,
            path: &["group", "active-active", "network-configuration", "sync", "qos"],
        },
        FieldSpec {
            name: "sync_virtual_router",
            ty: Bool,
            path: &["group", "active-active", "network-configuration", "sync", "virtual-router"],
        },
        FieldSpec {
            name: "ip_hash_key",
            ty: Str,
            path: &["group", "active-active", "ip-hash-key"],
        },
    ],
    slots: &[
        SlotSpec { name: "ha1", object: &HA1 },
        SlotSpec { name: "ha1_backup", object: &HA1_BACKUP },
        SlotSpec { name: "ha2", object: &HA2 },
        SlotSpec { name: "ha2_backup", object: &HA2_BACKUP },
        SlotSpec { name: "ha3", object: &HA3 },
    ],
    // Not echoed back consistently by the device.
    unreliable_fields: &["session_owner_selection", "session_setup"],
};

const OPTIONS: &[OptionSpec] = &[
    OptionSpec::new("ha_enabled", Bool, "Enable HA.").default_value(DefaultValue::Bool(true)),
    OptionSpec::new("ha_group_id", Int, "The group identifier.")
        .default_value(DefaultValue::Int(1)),
    OptionSpec::new("ha_config_sync", Bool, "Enable configuration synchronization.")
        .default_value(DefaultValue::Bool(true)),
    OptionSpec::new("ha_peer_ip", Str, "HA peer HA1 IP address."),
    OptionSpec::new("ha_peer_ip_backup", Str, "HA peer HA1 backup IP address."),
    OptionSpec::new("ha_mode", Str, "Mode of HA.")
        .default_value(DefaultValue::Str("active-passive"))
        .choices(Choices::Str(&["active-passive", "active-active"])),
    OptionSpec::new("ha_passive_link_state", Str, "Passive link state.")
        .default_value(DefaultValue::Str("auto"))
        .choices(Choices::Str(&["shutdown", "auto"])),
    OptionSpec::new("ha_state_sync", Bool, "Enable state synchronization.")
        .default_value(DefaultValue::Bool(false)),
    OptionSpec::new("ha_ha2_keepalive", Bool, "Enable HA2 keepalives.")
        .default_value(DefaultValue::Bool(true)),
    OptionSpec::new("ha_ha2_keepalive_action", Str, "HA2 keepalive action."),
    OptionSpec::new("ha_ha2_keepalive_threshold", Int, "HA2 keepalive threshold."),
    OptionSpec::new("ha_device_id", Int, "HA3 device id.").choices(Choices::Int(&[0, 1])),
    OptionSpec::new("ha_session_owner_selection", Str, "Active-active session owner mode.")
        .choices(Choices::Str(&["primary-device", "first-packet"])),
    OptionSpec::new("ha_session_setup", Str, "Active-active session setup mode.").choices(
        Choices::Str(&["primary-device", "first-packet", "ip-modulo", "ip-hash"]),
    ),
    OptionSpec::new("ha_tentative_hold_time", Int, "Active-active tentative hold timer."),
    OptionSpec::new("ha_sync_qos", Bool, "Active-active network sync QoS."),
    OptionSpec::new("ha_sync_virtual_router", Bool, "Active-active network sync virtual router."),
    OptionSpec::new("ha_ip_hash_key", Str, "Hash key used by the ip-hash algorithm.")
        .choices(Choices::Str(&["source", "source-and-destination"])),
    OptionSpec::new("ha1_ip_address", Str, "IP of the HA1 interface."),
    OptionSpec::new("ha1_netmask", Str, "Netmask of the HA1 interface."),
    OptionSpec::new("ha1_port", Str, "Interface used for HA1 (eg. ethernet1/5)."),
    OptionSpec::new("ha1_gateway", Str, "Default gateway of the HA1 interface."),
    OptionSpec::new("ha1b_ip_address", Str, "IP of the HA1 backup interface."),
    OptionSpec::new("ha1b_netmask", Str, "Netmask of the HA1 backup interface."),
    OptionSpec::new("ha1b_port", Str, "Interface used for HA1 backup."),
    OptionSpec::new("ha1b_gateway", Str, "Default gateway of the HA1 backup interface."),
    OptionSpec::new("ha2_ip_address", Str, "IP of the HA2 interface."),
    OptionSpec::new("ha2_netmask", Str, "Netmask of the HA2 interface."),
    OptionSpec::new("ha2_port", Str, "Interface used for HA2.")
        .default_value(DefaultValue::Str("ha2-a")),
    OptionSpec::new("ha2_gateway", Str, "Default gateway of the HA2 interface."),
    OptionSpec::new("ha2b_ip_address", Str, "IP of the HA2 backup interface."),
    OptionSpec::new("ha2b_netmask", Str, "Netmask of the HA2 backup interface."),
    OptionSpec::new("ha2b_port", Str, "Interface used for HA2 backup."),
    OptionSpec::new("ha2b_gateway", Str, "Default gateway of the HA2 backup interface."),
    OptionSpec::new("ha3_port", Str, "Interface used for HA3 (eg. ethernet1/5, ae1)."),
];

const BINDINGS: &[Binding] = &[
    Binding::root("ha_enabled", "enabled"),
    Binding::root("ha_group_id", "group_id"),
    Binding::root("ha_config_sync", "config_sync"),
    Binding::root("ha_peer_ip", "peer_ip"),
    Binding::root("ha_peer_ip_backup", "peer_ip_backup"),
    Binding::root("ha_mode", "mode"),
    Binding::root("ha_passive_link_state", "passive_link_state"),
    Binding::root("ha_state_sync", "state_sync"),
    Binding::root("ha_ha2_keepalive", "ha2_keepalive"),
    Binding::root("ha_ha2_keepalive_action", "ha2_keepalive_action"),
    Binding::root("ha_ha2_keepalive_threshold", "ha2_keepalive_threshold"),
    Binding::root("ha_device_id", "device_id"),
    Binding::root("ha_session_owner_selection", "session_owner_selection"),
    Binding::root("ha_session_setup", "session_setup"),
    Binding::root("ha_tentative_hold_time", "tentative_hold_time"),
    Binding::root("ha_sync_qos", "sync_qos"),
    Binding::root("ha_sync_virtual_router", "sync_virtual_router"),
    Binding::root("ha_ip_hash_key", "ip_hash_key"),
    Binding::slot("ha1_ip_address", "ha1", "ip_address"),
    Binding::slot("ha1_netmask", "ha1", "netmask"),
    Binding::slot("ha1_port", "ha1", "port"),
    Binding::slot("ha1_gateway", "ha1", "gateway"),
    Binding::slot("ha1b_ip_address", "ha1_backup", "ip_address"),
    Binding::slot("ha1b_netmask", "ha1_backup", "netmask"),
    Binding::slot("ha1b_port", "ha1_backup", "port"),
    Binding::slot("ha1b_gateway", "ha1_backup", "gateway"),
    Binding::slot("ha2_ip_address", "ha2", "ip_address"),
    Binding::slot("ha2_netmask", "ha2", "netmask"),
    Binding::slot("ha2_port", "ha2", "port"),
    Binding::slot("ha2_gateway", "ha2", "gateway"),
    Binding::slot("ha2b_ip_address", "ha2_backup", "ip_address"),
    Binding::slot("ha2b_netmask", "ha2_backup", "netmask"),
    Binding::slot("ha2b_port", "ha2_backup", "port"),
    Binding::slot("ha2b_gateway", "ha2_backup", "gateway"),
    Binding::slot("ha3_port", "ha3", "port"),
];

inventory::submit! {
    ModuleDef {
        name: "ha",
        summary: "Manage high availability configuration.",
        root: &HIGH_AVAILABILITY,
        options: OPTIONS,
        bindings: BINDINGS,
        states: &[State::Present, State::Absent],
        default_state: State::Present,
        gathered_filter: false,
        min_version: None,
    }
}

pub fn build_high_availability(fields: &ParameterSet) -> ConfigObject {
    let mut ha = ConfigObject::new(&HIGH_AVAILABILITY);
    ha.set("enabled", fields.get("enabled").clone());
    ha.set("group_id", fields.get("group_id").clone());
    ha.set("config_sync", fields.get("config_sync").clone());
    ha.set("peer_ip", fields.get("peer_ip").clone());
    ha.set("peer_ip_backup", fields.get("peer_ip_backup").clone());
    ha.set("mode", fields.get("mode").clone());
    ha.set("passive_link_state", fields.get("passive_link_state").clone());
    ha.set("state_sync", fields.get("state_sync").clone());
    ha.set("ha2_keepalive", fields.get("ha2_keepalive").clone());
    ha.set("ha2_keepalive_action", fields.get("ha2_keepalive_action").clone());
    ha.set("ha2_keepalive_threshold", fields.get("ha2_keepalive_threshold").clone());
    ha.set("device_id", fields.get("device_id").clone());
    ha.set("session_owner_selection", fields.get("session_owner_selection").clone());
    ha.set("session_setup", fields.get("session_setup").clone());
    ha.set("tentative_hold_time", fields.get("tentative_hold_time").clone());
    ha.set("sync_qos", fields.get("sync_qos").clone());
    ha.set("sync_virtual_router", fields.get("sync_virtual_router").clone());
    ha.set("ip_hash_key", fields.get("ip_hash_key").clone());
    ha
}

fn build_interface(spec: &'static ObjectSpec, fields: &ParameterSet) -> ConfigObject {
    let mut interface = ConfigObject::new(spec);
    interface.set("ip_address", fields.get("ip_address").clone());
    interface.set("netmask", fields.get("netmask").clone());
    interface.set("port", fields.get("port").clone());
    interface.set("gateway", fields.get("gateway").clone());
    interface
}

pub fn build_ha1(fields: &ParameterSet) -> ConfigObject {
    build_interface(&HA1, fields)
}

pub fn build_ha1_backup(fields: &ParameterSet) -> ConfigObject {
    build_interface(&HA1_BACKUP, fields)
}

pub fn build_ha2(fields: &ParameterSet) -> ConfigObject {
    build_interface(&HA2, fields)
}

pub fn build_ha2_backup(fields: &ParameterSet) -> ConfigObject {
    build_interface(&HA2_BACKUP, fields)
}

pub fn build_ha3(fields: &ParameterSet) -> ConfigObject {
    let mut ha3 = ConfigObject::new(&HA3);
    ha3.set("port", fields.get("port").clone());
    ha3
}
