//! Domain services for the VLAN portal.

pub mod device_store;

pub use device_store::{DeviceStore, InMemoryDeviceStore, StoreError};
