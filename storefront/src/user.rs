//! User accounts with embedded address book.

use crate::errors::{ServiceError, ServiceResult};
use crate::types::{AddressId, EmailAddress, PersonName, PhoneNumber, Pincode, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper.
    User,
    /// Back-office administrator.
    Admin,
}

/// A saved address embedded in the user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Local identifier within the user document.
    pub id: AddressId,
    /// Recipient full name.
    pub full_name: PersonName,
    /// Contact phone, 10 digits.
    pub phone: PhoneNumber,
    /// Street address, first line.
    pub address_line1: String,
    /// Street address, second line.
    pub address_line2: Option<String>,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Postal code, 6 digits.
    pub pincode: Pincode,
    /// Whether this is the default shipping address.
    pub is_default: bool,
}

/// Input for adding or editing a saved address.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressDraft {
    /// Recipient full name.
    pub full_name: PersonName,
    /// Contact phone, 10 digits.
    pub phone: PhoneNumber,
    /// Street address, first line.
    pub address_line1: String,
    /// Street address, second line.
    #[serde(default)]
    pub address_line2: Option<String>,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// Postal code, 6 digits.
    pub pincode: Pincode,
    /// Mark this address as the default.
    #[serde(default)]
    pub is_default: bool,
}

/// A user account document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity.
    pub id: UserId,
    /// Display name.
    pub name: PersonName,
    /// Unique, lowercased email.
    pub email: EmailAddress,
    /// Bcrypt password hash. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role.
    pub role: Role,
    /// Saved addresses; at most one is flagged default.
    pub addresses: Vec<Address>,
    /// Optional contact phone.
    pub phone: Option<PhoneNumber>,
    /// Blocked accounts cannot log in.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a fresh regular-user account.
    pub fn create(name: PersonName, email: EmailAddress, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name,
            email,
            password_hash,
            role: Role::User,
            addresses: Vec::new(),
            phone: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the account has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Append a new address. The first saved address becomes the default; a
    /// draft flagged default displaces any existing default.
    pub fn add_address(&mut self, draft: AddressDraft) -> AddressId {
        let make_default = draft.is_default || self.addresses.is_empty();
        if make_default {
            for address in &mut self.addresses {
                address.is_default = false;
            }
        }
        let address = Address {
            id: AddressId::new(),
            full_name: draft.full_name,
            phone: draft.phone,
            address_line1: draft.address_line1,
            address_line2: draft.address_line2,
            city: draft.city,
            state: draft.state,
            pincode: draft.pincode,
            is_default: make_default,
        };
        let id = address.id;
        self.addresses.push(address);
        self.updated_at = Utc::now();
        id
    }

    /// Replace an existing address, keeping the single-default invariant.
    pub fn update_address(&mut self, id: AddressId, draft: AddressDraft) -> ServiceResult<()> {
        if !self.addresses.iter().any(|a| a.id == id) {
            return Err(ServiceError::NotFound("Address"));
        }
        if draft.is_default {
            for address in &mut self.addresses {
                address.is_default = false;
            }
        }
        for address in &mut self.addresses {
            if address.id == id {
                address.full_name = draft.full_name;
                address.phone = draft.phone;
                address.address_line1 = draft.address_line1;
                address.address_line2 = draft.address_line2;
                address.city = draft.city;
                address.state = draft.state;
                address.pincode = draft.pincode;
                address.is_default = draft.is_default;
                break;
            }
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove an address by its local id.
    pub fn remove_address(&mut self, id: AddressId) -> ServiceResult<()> {
        let before = self.addresses.len();
        self.addresses.retain(|a| a.id != id);
        if self.addresses.len() == before {
            return Err(ServiceError::NotFound("Address"));
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::create(
            PersonName::try_new("Asha").unwrap(),
            EmailAddress::try_new("asha@example.com").unwrap(),
            "hash".to_string(),
        )
    }

    fn address_draft(is_default: bool) -> AddressDraft {
        AddressDraft {
            full_name: PersonName::try_new("Asha Rao").unwrap(),
            phone: PhoneNumber::try_new("9876543210").unwrap(),
            address_line1: "12 MG Road".to_string(),
            address_line2: None,
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: Pincode::try_new("560001").unwrap(),
            is_default,
        }
    }

    #[test]
    fn first_address_becomes_default() {
        let mut user = user();
        user.add_address(address_draft(false));
        assert!(user.addresses[0].is_default);
    }

    #[test]
    fn at_most_one_default_address() {
        let mut user = user();
        let first = user.add_address(address_draft(false));
        let second = user.add_address(address_draft(true));

        let defaults: Vec<_> = user.addresses.iter().filter(|a| a.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, second);

        user.update_address(first, address_draft(true)).unwrap();
        let defaults: Vec<_> = user.addresses.iter().filter(|a| a.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, first);
    }

    #[test]
    fn removing_unknown_address_reports_not_found() {
        let mut user = user();
        assert_eq!(
            user.remove_address(AddressId::new()),
            Err(ServiceError::NotFound("Address"))
        );
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = user();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("email").is_some());
    }
}
