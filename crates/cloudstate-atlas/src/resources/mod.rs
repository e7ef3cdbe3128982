//! Atlas resource type definitions

pub mod identity_provider;
pub mod ldap_verify;
pub mod stream_connection;

use crate::client::Route;
use cloudstate_core::ResourceType;

/// Every resource type with its route
pub fn all() -> Vec<(ResourceType, Route)> {
    vec![
        (identity_provider::definition(), identity_provider::ROUTE),
        (ldap_verify::definition(), ldap_verify::ROUTE),
        (stream_connection::definition(), stream_connection::ROUTE),
    ]
}
