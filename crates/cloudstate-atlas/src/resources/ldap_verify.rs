//! `ldap_verify`: asynchronous LDAP configuration verification requests
//!
//! Atlas never returns the bind password or CA certificate, and a
//! verification request cannot be modified or deleted once submitted.

use crate::client::Route;
use cloudstate_core::{Capabilities, FieldSpec, ImportFormat, Operation, ResourceType, Schema};

pub const NAME: &str = "ldap_verify";

pub const ROUTE: Route = Route {
    collection: "/api/atlas/v2/groups/{project_id}/userSecurity/ldap/verify",
    item: "/api/atlas/v2/groups/{project_id}/userSecurity/ldap/verify/{request_id}",
};

pub fn definition() -> ResourceType {
    ResourceType::new(
        NAME,
        Schema::new(vec![
            FieldSpec::string("project_id", "groupId").address(),
            FieldSpec::string("request_id", "requestId"),
            FieldSpec::string("hostname", "request.hostname")
                .immutable()
                .sent_as("hostname"),
            FieldSpec::int("port", "request.port")
                .default_value(636_i64)
                .immutable()
                .sent_as("port"),
            FieldSpec::string("bind_username", "request.bindUsername")
                .immutable()
                .sent_as("bindUsername"),
            FieldSpec::string("bind_password", "bindPassword").write_only(),
            FieldSpec::string("ca_certificate", "caCertificate").write_only(),
            FieldSpec::string("authz_query_template", "authzQueryTemplate").write_only(),
            FieldSpec::string("status", "status"),
            FieldSpec::list(
                "links",
                "links",
                Schema::new(vec![
                    FieldSpec::string("href", "href"),
                    FieldSpec::string("rel", "rel"),
                ]),
            ),
            FieldSpec::list(
                "validations",
                "validations",
                Schema::new(vec![
                    FieldSpec::string("status", "status"),
                    FieldSpec::string("validation_type", "validationType"),
                ]),
            ),
        ]),
    )
    .id_from_input("project_id")
    .id_from_response("request_id", "requestId")
    .require("hostname")
    .require("bind_username")
    .require("bind_password")
    .read_with(Operation::GetStatus)
    .capabilities(Capabilities {
        update: false,
        remote_delete: false,
        list: false,
        ..Default::default()
    })
    .import_format(
        ImportFormat::new()
            .object_id("project_id")
            .object_id("request_id"),
    )
}
