//! myLeviton API port and wire models.
//!
//! [`DecoraApi`] is the seam between the integration and the vendor cloud:
//! [`LevitonClient`](crate::client::LevitonClient) implements it over HTTPS,
//! tests implement it in memory.

use std::fmt;
use std::future::Future;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DecoraError;

/// Model tag of the Decora Smart Wi-Fi 4-speed fan controller.
pub const FAN_MODEL: &str = "DW4SF";

macro_rules! vendor_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

vendor_id!(
    /// myLeviton user id.
    PersonId
);
vendor_id!(
    /// A residential account groups one or more residences.
    ResidentialAccountId
);
vendor_id!(
    /// A single residence (home).
    ResidenceId
);
vendor_id!(
    /// A Wi-Fi switch or dimmer.
    SwitchId
);

/// The authenticated myLeviton user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Person {
    pub id: PersonId,
}

/// What a residential permission grants access to.
///
/// An account grant is checked first: a record carrying both ids is an
/// [`Account`](Self::Account) permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "PermissionRecord")]
pub enum Permission {
    Account(ResidentialAccountId),
    Residence(ResidenceId),
    Other,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermissionRecord {
    #[serde(default)]
    residential_account_id: Option<ResidentialAccountId>,
    #[serde(default)]
    residence_id: Option<ResidenceId>,
}

impl From<PermissionRecord> for Permission {
    fn from(record: PermissionRecord) -> Self {
        match (record.residential_account_id, record.residence_id) {
            (Some(account), _) => Self::Account(account),
            (None, Some(residence)) => Self::Residence(residence),
            (None, None) => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Residence {
    pub id: ResidenceId,
    #[serde(default)]
    pub name: String,
}

/// Last known state of a switch as reported by myLeviton.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IotSwitch {
    pub id: SwitchId,
    /// Empty when myLeviton sends no name or `null`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default)]
    pub model: String,
    /// `"ON"` or `"OFF"`; kept raw so unexpected values stay visible.
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub brightness: Option<i64>,
}

impl IotSwitch {
    #[must_use]
    pub fn is_fan(&self) -> bool {
        self.model == FAN_MODEL
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Power {
    On,
    Off,
}

/// Attribute-update payload for a switch; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SwitchUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<Power>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<u8>,
}

impl SwitchUpdate {
    #[must_use]
    pub fn power(power: Power) -> Self {
        Self {
            power: Some(power),
            brightness: None,
        }
    }

    #[must_use]
    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }
}

/// Session-scoped access to the myLeviton cloud.
///
/// Implementations own the session token: [`login`](Self::login) opens it,
/// [`logout`](Self::logout) closes it and every other call uses it.
pub trait DecoraApi: Send + Sync {
    /// Open a session. `Ok(None)` means the credentials were rejected.
    fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<Option<Person>, DecoraError>> + Send;

    fn logout(&self) -> impl Future<Output = Result<(), DecoraError>> + Send;

    fn residential_permissions(
        &self,
        person: PersonId,
    ) -> impl Future<Output = Result<Vec<Permission>, DecoraError>> + Send;

    fn residences(
        &self,
        account: ResidentialAccountId,
    ) -> impl Future<Output = Result<Vec<Residence>, DecoraError>> + Send;

    fn iot_switches(
        &self,
        residence: ResidenceId,
    ) -> impl Future<Output = Result<Vec<IotSwitch>, DecoraError>> + Send;

    /// Apply `update` and return the switch as stored afterwards.
    fn update_switch(
        &self,
        id: SwitchId,
        update: &SwitchUpdate,
    ) -> impl Future<Output = Result<IotSwitch, DecoraError>> + Send;

    /// Fetch the current state of one switch.
    fn fetch_switch(&self, id: SwitchId)
    -> impl Future<Output = Result<IotSwitch, DecoraError>> + Send;
}
