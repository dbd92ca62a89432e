//! Device domain models.
//!
//! A registered device is spread over three records that share the
//! normalized MAC address: the identity, its VLAN group membership and the
//! pre-shared credential used by the RADIUS server.

use serde::{Deserialize, Serialize};
use shared::mac::{format_mac_display, normalize_mac};
use shared::validation::{validate_mac_address, validate_vlan_name};
use validator::ValidationErrors;

/// Attribute name of the credential row.
pub const CREDENTIAL_ATTRIBUTE: &str = "Cleartext-Password";

/// Operator of the credential row.
pub const CREDENTIAL_OP: &str = ":=";

/// Priority assigned to new group memberships.
pub const DEFAULT_GROUP_PRIORITY: i32 = 0;

/// "This device exists and is registered."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i32,
    pub mac: String,
    pub description: Option<String>,
}

/// "This device belongs to VLAN X."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub id: i32,
    pub mac: String,
    pub group_name: String,
    pub priority: i32,
}

/// "This device authenticates with a pre-shared credential equal to its own MAC."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: i32,
    pub mac: String,
    pub attribute: String,
    pub op: String,
    pub value: String,
}

/// Presentation view of a device: an identity plus its group name.
///
/// Carries both the MAC as the user typed it (for echoing a form back) and
/// the normalized form (for lookups).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceView {
    pub mac_input: String,
    pub mac: String,
    pub description: Option<String>,
    pub vlan_name: Option<String>,
}

impl DeviceView {
    /// Builds a view from a MAC in any textual form.
    pub fn new(mac_input: &str, description: Option<String>, vlan_name: Option<String>) -> Self {
        Self {
            mac_input: mac_input.to_string(),
            mac: normalize_mac(mac_input).unwrap_or_default(),
            description,
            vlan_name,
        }
    }

    /// MAC address as `aa:bb:cc:dd:ee:ff`.
    pub fn formatted_mac(&self) -> String {
        format_mac_display(&self.mac)
    }
}

/// Submitted add/edit form, as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceForm {
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub vlan_name: String,
    #[serde(default)]
    pub description: String,
}

/// Validated input for registering a new device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    pub mac: String,
    pub description: Option<String>,
    pub vlan_name: String,
}

/// Validated input for editing an existing device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceUpdate {
    pub description: Option<String>,
    pub vlan_name: String,
}

impl DeviceForm {
    /// Validates the form for device creation.
    ///
    /// Every violated constraint is collected so that all problems are
    /// reported in a single round trip.
    pub fn validate_new(&self, vlan_names: &[String]) -> Result<NewDevice, ValidationErrors> {
        let mac_input = self.mac_address.trim();
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_mac_address(mac_input) {
            errors.add("mac_address", e);
        }
        if let Err(e) = validate_vlan_name(&self.vlan_name, vlan_names) {
            errors.add("vlan_name", e);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewDevice {
            mac: normalize_mac(mac_input).unwrap_or_default(),
            description: self.trimmed_description(),
            vlan_name: self.vlan_name.clone(),
        })
    }

    /// Validates the form for an edit. The MAC address is not part of it.
    pub fn validate_update(&self, vlan_names: &[String]) -> Result<DeviceUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_vlan_name(&self.vlan_name, vlan_names) {
            errors.add("vlan_name", e);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(DeviceUpdate {
            description: self.trimmed_description(),
            vlan_name: self.vlan_name.clone(),
        })
    }

    /// View echoing the submitted values back, keyed on the given MAC text.
    pub fn to_view(&self, mac_input: &str) -> DeviceView {
        DeviceView::new(
            mac_input.trim(),
            self.trimmed_description(),
            Some(self.vlan_name.clone()).filter(|v| !v.is_empty()),
        )
    }

    fn trimmed_description(&self) -> Option<String> {
        let description = self.description.trim();
        if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        }
    }
}

/// Flattens validation errors into user-facing messages, ordered by field.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field))
            })
        })
        .collect()
}
