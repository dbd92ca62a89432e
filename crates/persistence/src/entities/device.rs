//! Device entities (database row mappings).
//!
//! The `username` column of every table holds the normalized MAC address.

use sqlx::FromRow;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: i32,
    pub username: String,
    pub description: Option<String>,
}

/// Database row mapping for the radusergroup table.
#[derive(Debug, Clone, FromRow)]
pub struct RadUserGroupEntity {
    pub id: i32,
    pub username: String,
    pub groupname: String,
    pub priority: i32,
}

/// Database row mapping for the radcheck table.
#[derive(Debug, Clone, FromRow)]
pub struct RadCheckEntity {
    pub id: i32,
    pub username: String,
    pub attribute: String,
    pub op: String,
    pub value: String,
}

/// A users row left-joined with its radusergroup row.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceRowEntity {
    pub username: String,
    pub description: Option<String>,
    pub groupname: Option<String>,
}

impl From<UserEntity> for domain::models::Identity {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            mac: entity.username,
            description: entity.description,
        }
    }
}

impl From<RadUserGroupEntity> for domain::models::GroupMembership {
    fn from(entity: RadUserGroupEntity) -> Self {
        Self {
            id: entity.id,
            mac: entity.username,
            group_name: entity.groupname,
            priority: entity.priority,
        }
    }
}

impl From<RadCheckEntity> for domain::models::Credential {
    fn from(entity: RadCheckEntity) -> Self {
        Self {
            id: entity.id,
            mac: entity.username,
            attribute: entity.attribute,
            op: entity.op,
            value: entity.value,
        }
    }
}

impl From<DeviceRowEntity> for domain::models::DeviceView {
    fn from(entity: DeviceRowEntity) -> Self {
        Self::new(&entity.username, entity.description, entity.groupname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_row_to_view() {
        let row = DeviceRowEntity {
            username: "aabbccddeeff".to_string(),
            description: Some("printer".to_string()),
            groupname: Some("iot".to_string()),
        };
        let view: domain::models::DeviceView = row.into();
        assert_eq!(view.mac, "aabbccddeeff");
        assert_eq!(view.formatted_mac(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(view.vlan_name.as_deref(), Some("iot"));
    }

    #[test]
    fn test_device_row_without_group() {
        let row = DeviceRowEntity {
            username: "aabbccddeeff".to_string(),
            description: None,
            groupname: None,
        };
        let view: domain::models::DeviceView = row.into();
        assert!(view.vlan_name.is_none());
        assert!(view.description.is_none());
    }

    #[test]
    fn test_rad_check_to_credential() {
        let entity = RadCheckEntity {
            id: 7,
            username: "aabbccddeeff".to_string(),
            attribute: "Cleartext-Password".to_string(),
            op: ":=".to_string(),
            value: "aabbccddeeff".to_string(),
        };
        let credential: domain::models::Credential = entity.into();
        assert_eq!(credential.id, 7);
        assert_eq!(credential.mac, credential.value);
    }

    #[test]
    fn test_entities_to_domain() {
        let user: domain::models::Identity = UserEntity {
            id: 1,
            username: "aabbccddeeff".to_string(),
            description: None,
        }
        .into();
        assert_eq!(user.mac, "aabbccddeeff");

        let group: domain::models::GroupMembership = RadUserGroupEntity {
            id: 2,
            username: "aabbccddeeff".to_string(),
            groupname: "guest".to_string(),
            priority: 0,
        }
        .into();
        assert_eq!(group.group_name, "guest");
        assert_eq!(group.priority, 0);
    }
}
