//! Device storage abstraction.
//!
//! A device is three rows (identity, group membership, credential) keyed by
//! the normalized MAC address. Every mutating operation of a [`DeviceStore`]
//! applies to all of them atomically.

use std::sync::{Mutex, MutexGuard};

use shared::mac::format_mac_display;
use thiserror::Error;

use crate::models::device::{
    Credential, DeviceView, GroupMembership, Identity, CREDENTIAL_ATTRIBUTE, CREDENTIAL_OP,
    DEFAULT_GROUP_PRIORITY,
};

/// Errors returned by device storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A device with this MAC address is already registered.
    #[error("Device already exists: {0}")]
    AlreadyExists(String),

    /// No device with this MAC address is registered.
    #[error("Device not found: {0}")]
    NotFound(String),

    /// Storage-layer fault of any kind.
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Transactional storage for registered devices.
#[async_trait::async_trait]
pub trait DeviceStore: Send + Sync {
    /// All devices ordered by MAC address. Devices without a group
    /// membership are listed with no VLAN.
    async fn list(&self) -> Result<Vec<DeviceView>, StoreError>;

    /// Looks up a single device by normalized MAC address.
    async fn find_by_mac(&self, mac: &str) -> Result<DeviceView, StoreError>;

    /// Registers a device: identity, group membership and credential.
    async fn create(
        &self,
        mac: &str,
        description: Option<&str>,
        vlan_name: &str,
    ) -> Result<(), StoreError>;

    /// Updates the description and VLAN of a device, inserting the group
    /// membership if it is missing. The credential is never touched.
    async fn update(
        &self,
        mac: &str,
        description: Option<&str>,
        vlan_name: &str,
    ) -> Result<(), StoreError>;

    /// Removes every row belonging to a device.
    async fn delete(&self, mac: &str) -> Result<(), StoreError>;

    /// Checks that the storage backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i32,
    users: Vec<Identity>,
    groups: Vec<GroupMembership>,
    credentials: Vec<Credential>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn identity_exists(&self, mac: &str) -> bool {
        self.users.iter().any(|u| u.mac == mac)
    }
}

/// In-memory device store for development and testing.
///
/// Mirrors the three-table layout so that partially registered devices
/// (for example an identity without a group membership) can be represented.
#[derive(Debug, Default)]
pub struct InMemoryDeviceStore {
    tables: Mutex<Tables>,
    /// Whether to simulate storage failures for testing.
    pub simulate_failure: bool,
}

impl InMemoryDeviceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every operation fails with a repository error.
    pub fn failing() -> Self {
        Self {
            tables: Mutex::default(),
            simulate_failure: true,
        }
    }

    /// Insert only the identity row for a device, leaving it without a
    /// group membership or credential.
    pub fn insert_identity_only(&self, mac: &str, description: Option<&str>) {
        if let Ok(mut tables) = self.tables.lock() {
            let id = tables.next_id();
            tables.users.push(Identity {
                id,
                mac: mac.to_string(),
                description: description.map(str::to_string),
            });
        }
    }

    /// Number of (identity, group membership, credential) rows for a MAC.
    pub fn row_counts(&self, mac: &str) -> (usize, usize, usize) {
        match self.tables.lock() {
            Ok(tables) => (
                tables.users.iter().filter(|r| r.mac == mac).count(),
                tables.groups.iter().filter(|r| r.mac == mac).count(),
                tables.credentials.iter().filter(|r| r.mac == mac).count(),
            ),
            Err(_) => (0, 0, 0),
        }
    }

    /// Credential row for a MAC, if any.
    pub fn credential(&self, mac: &str) -> Option<Credential> {
        self.tables
            .lock()
            .ok()
            .and_then(|tables| tables.credentials.iter().find(|c| c.mac == mac).cloned())
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        if self.simulate_failure {
            tracing::warn!("In-memory device store simulating failure");
            return Err(StoreError::Repository("simulated storage failure".to_string()));
        }
        self.tables
            .lock()
            .map_err(|_| StoreError::Repository("device store lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn list(&self) -> Result<Vec<DeviceView>, StoreError> {
        let tables = self.tables()?;

        let mut users: Vec<&Identity> = tables.users.iter().collect();
        users.sort_by(|a, b| a.mac.cmp(&b.mac));

        let mut devices = Vec::with_capacity(users.len());
        for user in users {
            let memberships: Vec<&GroupMembership> =
                tables.groups.iter().filter(|g| g.mac == user.mac).collect();
            if memberships.is_empty() {
                devices.push(DeviceView::new(&user.mac, user.description.clone(), None));
            }
            for membership in memberships {
                devices.push(DeviceView::new(
                    &user.mac,
                    user.description.clone(),
                    Some(membership.group_name.clone()),
                ));
            }
        }
        Ok(devices)
    }

    async fn find_by_mac(&self, mac: &str) -> Result<DeviceView, StoreError> {
        let tables = self.tables()?;

        let user = tables
            .users
            .iter()
            .find(|u| u.mac == mac)
            .ok_or_else(|| StoreError::NotFound(format_mac_display(mac)))?;
        let vlan_name = tables
            .groups
            .iter()
            .find(|g| g.mac == mac)
            .map(|g| g.group_name.clone());

        Ok(DeviceView::new(&user.mac, user.description.clone(), vlan_name))
    }

    async fn create(
        &self,
        mac: &str,
        description: Option<&str>,
        vlan_name: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables()?;

        if tables.identity_exists(mac) {
            return Err(StoreError::AlreadyExists(format_mac_display(mac)));
        }

        let id = tables.next_id();
        tables.users.push(Identity {
            id,
            mac: mac.to_string(),
            description: description.map(str::to_string),
        });
        let id = tables.next_id();
        tables.groups.push(GroupMembership {
            id,
            mac: mac.to_string(),
            group_name: vlan_name.to_string(),
            priority: DEFAULT_GROUP_PRIORITY,
        });
        let id = tables.next_id();
        tables.credentials.push(Credential {
            id,
            mac: mac.to_string(),
            attribute: CREDENTIAL_ATTRIBUTE.to_string(),
            op: CREDENTIAL_OP.to_string(),
            value: mac.to_string(),
        });
        Ok(())
    }

    async fn update(
        &self,
        mac: &str,
        description: Option<&str>,
        vlan_name: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables()?;

        let user = tables
            .users
            .iter_mut()
            .find(|u| u.mac == mac)
            .ok_or_else(|| StoreError::NotFound(format_mac_display(mac)))?;
        user.description = description.map(str::to_string);

        match tables.groups.iter().position(|g| g.mac == mac) {
            Some(idx) => tables.groups[idx].group_name = vlan_name.to_string(),
            None => {
                let id = tables.next_id();
                tables.groups.push(GroupMembership {
                    id,
                    mac: mac.to_string(),
                    group_name: vlan_name.to_string(),
                    priority: DEFAULT_GROUP_PRIORITY,
                });
            }
        }
        Ok(())
    }

    async fn delete(&self, mac: &str) -> Result<(), StoreError> {
        let mut tables = self.tables()?;

        if !tables.identity_exists(mac) {
            return Err(StoreError::NotFound(format_mac_display(mac)));
        }

        tables.credentials.retain(|c| c.mac != mac);
        tables.groups.retain(|g| g.mac != mac);
        tables.users.retain(|u| u.mac != mac);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.tables().map(|_| ())
    }
}
