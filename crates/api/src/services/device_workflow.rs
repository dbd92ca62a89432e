//! Device registration workflow.
//!
//! Validates submitted forms, calls the [`DeviceStore`] and turns every
//! result into an outcome the HTTP layer can render. Validation failures,
//! duplicates and storage faults never escape as errors; storage details go
//! to the log only.

use domain::models::{validation_messages, DeviceForm, DeviceView};
use domain::services::{DeviceStore, StoreError};
use shared::mac::{format_mac_display, normalize_mac};

/// Result of submitting the add or edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Input was rejected; re-render the form with the echoed input.
    Rejected {
        view: DeviceView,
        errors: Vec<String>,
    },
    /// Changes were stored; redirect to the list with this confirmation.
    Persisted { message: String },
    /// Storage failed; re-render the form with a generic message.
    StorageFailed { view: DeviceView, message: String },
    /// The targeted device does not exist.
    NotFound,
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { message: String },
    NotFound,
    StorageFailed { message: String },
}

pub struct DeviceWorkflow<'a> {
    store: &'a dyn DeviceStore,
    vlan_names: &'a [String],
}

impl<'a> DeviceWorkflow<'a> {
    pub fn new(store: &'a dyn DeviceStore, vlan_names: &'a [String]) -> Self {
        Self { store, vlan_names }
    }

    pub fn vlan_names(&self) -> &[String] {
        self.vlan_names
    }

    /// All devices ordered by MAC.
    pub async fn list(&self) -> Result<Vec<DeviceView>, StoreError> {
        self.store.list().await.inspect_err(|e| {
            tracing::error!(operation = "list_devices", error = %e, "Failed to fetch devices");
        })
    }

    /// Loads a device by the MAC text from the URL, keeping that text as
    /// the view's input value. `Ok(None)` when the device is unknown.
    pub async fn load(&self, mac_input: &str) -> Result<Option<DeviceView>, StoreError> {
        let Some(mac) = normalize_mac(mac_input) else {
            return Ok(None);
        };

        match self.store.find_by_mac(&mac).await {
            Ok(device) => Ok(Some(DeviceView {
                mac_input: mac_input.to_string(),
                ..device
            })),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => {
                tracing::error!(
                    operation = "find_device",
                    mac = %mac_input,
                    error = %e,
                    "Failed to load device"
                );
                Err(e)
            }
        }
    }

    /// Registers a new device.
    pub async fn create(&self, form: &DeviceForm, actor: &str) -> FormOutcome {
        let view = form.to_view(&form.mac_address);

        let device = match form.validate_new(self.vlan_names) {
            Ok(device) => device,
            Err(errors) => {
                return FormOutcome::Rejected {
                    view,
                    errors: validation_messages(&errors),
                }
            }
        };
        let display_mac = format_mac_display(&device.mac);

        match self
            .store
            .create(&device.mac, device.description.as_deref(), &device.vlan_name)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    user = %actor,
                    mac = %display_mac,
                    normalized_mac = %device.mac,
                    vlan = %device.vlan_name,
                    "Device added"
                );
                FormOutcome::Persisted {
                    message: format!("Device {} added successfully!", display_mac),
                }
            }
            Err(StoreError::AlreadyExists(_)) => FormOutcome::Rejected {
                view,
                errors: vec![format!("Device with MAC address {} already exists.", display_mac)],
            },
            Err(e) => {
                tracing::error!(
                    operation = "create_device",
                    mac = %form.mac_address.trim(),
                    error = %e,
                    "Failed to add device"
                );
                FormOutcome::StorageFailed {
                    view,
                    message: "Database error occurred while adding device.".to_string(),
                }
            }
        }
    }

    /// Changes the description and VLAN of an existing device.
    pub async fn update(&self, mac_input: &str, form: &DeviceForm, actor: &str) -> FormOutcome {
        let view = form.to_view(mac_input);
        let storage_failed = || FormOutcome::StorageFailed {
            view: view.clone(),
            message: "Database error occurred while updating device.".to_string(),
        };

        match self.load(mac_input).await {
            Ok(Some(_)) => {}
            Ok(None) => return FormOutcome::NotFound,
            Err(_) => return storage_failed(),
        }

        let update = match form.validate_update(self.vlan_names) {
            Ok(update) => update,
            Err(errors) => {
                return FormOutcome::Rejected {
                    view,
                    errors: validation_messages(&errors),
                }
            }
        };
        let display_mac = view.formatted_mac();

        match self
            .store
            .update(&view.mac, update.description.as_deref(), &update.vlan_name)
            .await
        {
            Ok(()) => {
                tracing::info!(
                    user = %actor,
                    mac = %display_mac,
                    normalized_mac = %view.mac,
                    vlan = %update.vlan_name,
                    "Device updated"
                );
                FormOutcome::Persisted {
                    message: format!("Device {} updated successfully!", display_mac),
                }
            }
            Err(StoreError::NotFound(_)) => FormOutcome::NotFound,
            Err(e) => {
                tracing::error!(
                    operation = "update_device",
                    mac = %mac_input,
                    error = %e,
                    "Failed to update device"
                );
                storage_failed()
            }
        }
    }

    /// Removes a device and all of its rows.
    pub async fn delete(&self, mac_input: &str, actor: &str) -> DeleteOutcome {
        let Some(mac) = normalize_mac(mac_input) else {
            return DeleteOutcome::NotFound;
        };
        let display_mac = format_mac_display(&mac);

        match self.store.delete(&mac).await {
            Ok(()) => {
                tracing::info!(
                    user = %actor,
                    mac = %display_mac,
                    normalized_mac = %mac,
                    "Device deleted"
                );
                DeleteOutcome::Deleted {
                    message: format!("Device {} deleted successfully.", display_mac),
                }
            }
            Err(StoreError::NotFound(_)) => DeleteOutcome::NotFound,
            Err(e) => {
                tracing::error!(
                    operation = "delete_device",
                    mac = %mac_input,
                    error = %e,
                    "Failed to delete device"
                );
                DeleteOutcome::StorageFailed {
                    message: format!(
                        "Database error occurred while deleting device {}.",
                        display_mac
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::services::InMemoryDeviceStore;

    fn vlans() -> Vec<String> {
        vec!["trusted".to_string(), "iot".to_string(), "guest".to_string()]
    }

    fn form(mac: &str, vlan: &str, description: &str) -> DeviceForm {
        DeviceForm {
            mac_address: mac.to_string(),
            vlan_name: vlan.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_persists_and_confirms() {
        let store = InMemoryDeviceStore::new();
        let vlans = vlans();
        let workflow = DeviceWorkflow::new(&store, &vlans);

        let outcome = workflow
            .create(&form("AA:BB:CC:DD:EE:FF", "iot", "test"), "alice")
            .await;
        assert_eq!(
            outcome,
            FormOutcome::Persisted {
                message: "Device aa:bb:cc:dd:ee:ff added successfully!".to_string()
            }
        );

        let devices = workflow.list().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].formatted_mac(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(devices[0].vlan_name.as_deref(), Some("iot"));
        assert_eq!(devices[0].description.as_deref(), Some("test"));
    }

    #[tokio::test]
    async fn test_create_rejects_with_all_errors_and_echo() {
        let store = InMemoryDeviceStore::new();
        let vlans = vlans();
        let workflow = DeviceWorkflow::new(&store, &vlans);

        match workflow.create(&form("zz-zz", "", "desc"), "alice").await {
            FormOutcome::Rejected { view, errors } => {
                assert_eq!(errors.len(), 2);
                assert_eq!(view.mac_input, "zz-zz");
                assert_eq!(view.description.as_deref(), Some("desc"));
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_in_other_notation() {
        let store = InMemoryDeviceStore::new();
        let vlans = vlans();
        let workflow = DeviceWorkflow::new(&store, &vlans);

        workflow
            .create(&form("aa:bb:cc:dd:ee:ff", "guest", ""), "alice")
            .await;
        let outcome = workflow
            .create(&form("AA-BB-CC-DD-EE-FF", "iot", ""), "alice")
            .await;

        match outcome {
            FormOutcome::Rejected { errors, .. } => assert_eq!(
                errors,
                vec!["Device with MAC address aa:bb:cc:dd:ee:ff already exists.".to_string()]
            ),
            other => panic!("Expected Rejected, got {:?}", other),
        }
        let device = store.find_by_mac("aabbccddeeff").await.unwrap();
        assert_eq!(device.vlan_name.as_deref(), Some("guest"));
    }

    #[tokio::test]
    async fn test_create_storage_failure_is_generic() {
        let store = InMemoryDeviceStore::failing();
        let vlans = vlans();
        let workflow = DeviceWorkflow::new(&store, &vlans);

        match workflow
            .create(&form("aa:bb:cc:dd:ee:ff", "iot", ""), "alice")
            .await
        {
            FormOutcome::StorageFailed { view, message } => {
                assert_eq!(message, "Database error occurred while adding device.");
                assert_eq!(view.mac_input, "aa:bb:cc:dd:ee:ff");
            }
            other => panic!("Expected StorageFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_unknown_device() {
        let store = InMemoryDeviceStore::new();
        let vlans = vlans();
        let workflow = DeviceWorkflow::new(&store, &vlans);

        let outcome = workflow
            .update("aa:bb:cc:dd:ee:ff", &form("", "iot", ""), "alice")
            .await;
        assert_eq!(outcome, FormOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_update_heals_missing_membership() {
        let store = InMemoryDeviceStore::new();
        store.insert_identity_only("aabbccddeeff", Some("orphan"));
        let vlans = vlans();
        let workflow = DeviceWorkflow::new(&store, &vlans);

        let outcome = workflow
            .update("aa-bb-cc-dd-ee-ff", &form("", "trusted", ""), "alice")
            .await;
        assert_eq!(
            outcome,
            FormOutcome::Persisted {
                message: "Device aa:bb:cc:dd:ee:ff updated successfully!".to_string()
            }
        );

        let device = store.find_by_mac("aabbccddeeff").await.unwrap();
        assert_eq!(device.vlan_name.as_deref(), Some("trusted"));
        assert!(device.description.is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_vlan() {
        let store = InMemoryDeviceStore::new();
        store.create("aabbccddeeff", None, "iot").await.unwrap();
        let vlans = vlans();
        let workflow = DeviceWorkflow::new(&store, &vlans);

        match workflow
            .update("aa:bb:cc:dd:ee:ff", &form("", "dmz", "new"), "alice")
            .await
        {
            FormOutcome::Rejected { view, errors } => {
                assert_eq!(
                    errors,
                    vec!["Invalid VLAN Name. Must be one of: trusted, iot, guest.".to_string()]
                );
                assert_eq!(view.mac_input, "aa:bb:cc:dd:ee:ff");
                assert_eq!(view.vlan_name.as_deref(), Some("dmz"));
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_keeps_url_text() {
        let store = InMemoryDeviceStore::new();
        store.create("aabbccddeeff", None, "iot").await.unwrap();
        let vlans = vlans();
        let workflow = DeviceWorkflow::new(&store, &vlans);

        let view = workflow.load("AA-BB-CC-DD-EE-FF").await.unwrap().unwrap();
        assert_eq!(view.mac_input, "AA-BB-CC-DD-EE-FF");
        assert_eq!(view.mac, "aabbccddeeff");
        assert!(workflow.load("11:22:33:44:55:66").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_then_not_found() {
        let store = InMemoryDeviceStore::new();
        store.create("aabbccddeeff", None, "iot").await.unwrap();
        let vlans = vlans();
        let workflow = DeviceWorkflow::new(&store, &vlans);

        assert_eq!(
            workflow.delete("aa:bb:cc:dd:ee:ff", "alice").await,
            DeleteOutcome::Deleted {
                message: "Device aa:bb:cc:dd:ee:ff deleted successfully.".to_string()
            }
        );
        assert_eq!(store.row_counts("aabbccddeeff"), (0, 0, 0));
        assert_eq!(
            workflow.delete("aa:bb:cc:dd:ee:ff", "alice").await,
            DeleteOutcome::NotFound
        );
        assert_eq!(
            workflow
                .update("aa:bb:cc:dd:ee:ff", &form("", "iot", ""), "alice")
                .await,
            FormOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_mutations_log_display_mac() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let store = InMemoryDeviceStore::new();
        let vlans = vlans();
        let workflow = DeviceWorkflow::new(&store, &vlans);

        assert_eq!(
            workflow
                .create(&form("aa-bb-cc-dd-ee-ff", "iot", ""), "alice")
                .await,
            FormOutcome::Persisted {
                message: "Device aa:bb:cc:dd:ee:ff added successfully!".to_string()
            }
        );
        assert_eq!(
            workflow
                .update("AA:BB:CC:DD:EE:FF", &form("", "guest", "tv"), "alice")
                .await,
            FormOutcome::Persisted {
                message: "Device aa:bb:cc:dd:ee:ff updated successfully!".to_string()
            }
        );
        assert_eq!(
            workflow.delete("aa:bb:cc:dd:ee:ff", "alice").await,
            DeleteOutcome::Deleted {
                message: "Device aa:bb:cc:dd:ee:ff deleted successfully.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_delete_storage_failure() {
        let store = InMemoryDeviceStore::failing();
        let vlans = vlans();
        let workflow = DeviceWorkflow::new(&store, &vlans);

        assert_eq!(
            workflow.delete("aa:bb:cc:dd:ee:ff", "alice").await,
            DeleteOutcome::StorageFailed {
                message: "Database error occurred while deleting device aa:bb:cc:dd:ee:ff."
                    .to_string()
            }
        );
    }
}
