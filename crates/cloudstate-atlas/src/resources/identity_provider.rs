//! `federated_settings_identity_provider`: SAML identity providers
//! attached to an organization's federation settings

use crate::client::Route;
use cloudstate_core::{FieldSpec, ImportFormat, ResourceType, Schema};

pub const NAME: &str = "federated_settings_identity_provider";

pub const ROUTE: Route = Route {
    collection: "/api/atlas/v2/federationSettings/{federation_settings_id}/identityProviders",
    item: "/api/atlas/v2/federationSettings/{federation_settings_id}/identityProviders/{okta_idp_id}",
};

pub fn definition() -> ResourceType {
    ResourceType::new(
        NAME,
        Schema::new(vec![
            FieldSpec::string("federation_settings_id", "federationSettingsId").address(),
            FieldSpec::string("okta_idp_id", "oktaIdpId"),
            FieldSpec::string("idp_id", "id"),
            FieldSpec::string("name", "displayName").input(),
            FieldSpec::string("protocol", "protocol")
                .default_value("SAML")
                .immutable(),
            FieldSpec::string_list("associated_domains", "associatedDomains").input(),
            FieldSpec::bool("sso_debug_enabled", "ssoDebugEnabled").input(),
            FieldSpec::string("status", "status").input(),
            FieldSpec::string("sso_url", "ssoUrl").input(),
            FieldSpec::string("issuer_uri", "issuerUri").input(),
            FieldSpec::string("request_binding", "requestBinding").input(),
            FieldSpec::string("response_signature_algorithm", "responseSignatureAlgorithm")
                .input(),
            FieldSpec::string("audience_uri", "audienceUri").input(),
        ]),
    )
    .id_from_input("federation_settings_id")
    .id_from_response("okta_idp_id", "oktaIdpId")
    .require("name")
    .require("issuer_uri")
    .require("sso_url")
    .import_format(
        ImportFormat::new()
            .object_id("federation_settings_id")
            .free("okta_idp_id"),
    )
}
