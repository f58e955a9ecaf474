//! Remote user record
//!
//! The denormalized user shape kept in the user directory cache.

use serde::{Deserialize, Serialize};

// == Server User ==
/// A user as described by the server, in whatever form the caller holds it.
///
/// The directory copies these fields into a [`RemoteUser`] before caching.
pub trait ServerUser {
    fn identifier(&self) -> &str;
    fn name(&self) -> &str;
    fn phone_number(&self) -> Option<&str>;
    fn public_key(&self) -> &[u8];
    fn public_signature(&self) -> &[u8];
}

// == Remote User ==
/// Cached copy of a server user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    pub identifier: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub public_key: Vec<u8>,
    pub public_signature: Vec<u8>,
}

impl RemoteUser {
    /// Copies the fields of any server user into an owned record.
    pub fn from_server_user<U: ServerUser + ?Sized>(user: &U) -> Self {
        Self {
            identifier: user.identifier().to_string(),
            name: user.name().to_string(),
            phone_number: user.phone_number().map(str::to_string),
            public_key: user.public_key().to_vec(),
            public_signature: user.public_signature().to_vec(),
        }
    }
}

impl ServerUser for RemoteUser {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    fn public_signature(&self) -> &[u8] {
        &self.public_signature
    }
}
