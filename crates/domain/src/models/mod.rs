//! Domain models for the VLAN portal.

pub mod device;

pub use device::{
    validation_messages, Credential, DeviceForm, DeviceUpdate, DeviceView, GroupMembership,
    Identity, NewDevice,
};
