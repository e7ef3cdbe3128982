//! `stream_connection`: connections registered on a stream processing
//! instance (Kafka brokers or Atlas clusters)

use crate::client::Route;
use cloudstate_core::{FieldSpec, ImportFormat, ResourceType, Schema};

pub const NAME: &str = "stream_connection";

pub const ROUTE: Route = Route {
    collection: "/api/atlas/v2/groups/{project_id}/streams/{instance_name}/connections",
    item: "/api/atlas/v2/groups/{project_id}/streams/{instance_name}/connections/{connection_name}",
};

pub fn definition() -> ResourceType {
    ResourceType::new(
        NAME,
        Schema::new(vec![
            FieldSpec::string("project_id", "groupId").address(),
            FieldSpec::string("instance_name", "instanceName").address(),
            FieldSpec::string("connection_name", "name")
                .address()
                .sent_as("name"),
            FieldSpec::string("type", "type").immutable(),
            FieldSpec::string("cluster_name", "clusterName").input(),
            FieldSpec::string("bootstrap_servers", "bootstrapServers").input(),
            FieldSpec::object(
                "authentication",
                "authentication",
                Schema::new(vec![
                    FieldSpec::string("mechanism", "mechanism").input(),
                    FieldSpec::string("username", "username").input(),
                    FieldSpec::string("password", "password").write_only(),
                ]),
            )
            .input(),
            FieldSpec::object(
                "security",
                "security",
                Schema::new(vec![
                    FieldSpec::string("protocol", "protocol").input(),
                    FieldSpec::string("broker_public_certificate", "brokerPublicCertificate")
                        .input(),
                ]),
            )
            .input(),
            FieldSpec::string_map("config", "config").input(),
            FieldSpec::object(
                "db_role_to_execute",
                "dbRoleToExecute",
                Schema::new(vec![
                    FieldSpec::string("role", "role").input(),
                    FieldSpec::string("type", "type").input(),
                ]),
            )
            .input(),
        ]),
    )
    .id_from_input("project_id")
    .id_from_input("instance_name")
    .id_from_input("connection_name")
    .require("type")
    .import_format(
        ImportFormat::new()
            .free("instance_name")
            .object_id("project_id")
            .free("connection_name"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudstate_core::{FlatValue, reconcile};
    use serde_json::json;

    #[test]
    fn test_flatten_kafka_connection() {
        let remote = json!({
            "name": "kafka-conn",
            "type": "Kafka",
            "bootstrapServers": "localhost:9092,localhost:9092",
            "authentication": {"mechanism": "PLAIN", "username": "user"},
            "security": {"protocol": "PLAINTEXT"},
            "config": {"auto.offset.reset": "earliest"}
        });

        let record = reconcile::flatten(&remote, definition().schema()).unwrap();
        assert_eq!(record.get_str("connection_name"), Some("kafka-conn"));

        let auth = record.get("authentication").and_then(FlatValue::as_record).unwrap();
        assert_eq!(auth.get_str("username"), Some("user"));
        assert!(!auth.contains("password"));

        assert_eq!(
            record.get("config").map(|v| v.to_json()),
            Some(json!({"auto.offset.reset": "earliest"}))
        );
        assert_eq!(record.get("db_role_to_execute"), Some(&FlatValue::Null));
    }

    #[test]
    fn test_flatten_cluster_connection() {
        let remote = json!({
            "name": "cluster-conn",
            "type": "Cluster",
            "clusterName": "Cluster0",
            "dbRoleToExecute": {"role": "atlasAdmin", "type": "BUILT_IN"}
        });

        let record = reconcile::flatten(&remote, definition().schema()).unwrap();
        let role = record
            .get("db_role_to_execute")
            .and_then(FlatValue::as_record)
            .unwrap();
        assert_eq!(role.get_str("role"), Some("atlasAdmin"));
        assert_eq!(record.get_str("bootstrap_servers"), Some(""));
    }

    #[test]
    fn test_import_with_dashed_names() {
        let fields = definition()
            .import_format_or_default()
            .parse("test-acc-instance-5f4e3d2c1b0a9f8e7d6c5b4a-my-kafka-conn")
            .unwrap();
        assert_eq!(fields["instance_name"], "test-acc-instance");
        assert_eq!(fields["project_id"], "5f4e3d2c1b0a9f8e7d6c5b4a");
        assert_eq!(fields["connection_name"], "my-kafka-conn");
    }
}
