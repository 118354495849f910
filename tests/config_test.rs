use cluster_node_service::common::config::{
    BackendType, ServerConfig, StorageType, app_config_hash, load_app_config, load_server_config,
};
use cluster_node_service::common::utils::config_hash;
use serde_json::json;
use std::io::Write;

#[test]
fn config_hash_ignores_key_order() {
    let a = json!({"ldap": {"url": "ldap://a", "port": 389}, "features": ["x", "y"]});
    let b: serde_json::Value =
        serde_json::from_str(r#"{"features":["x","y"],"ldap":{"port":389,"url":"ldap://a"}}"#).unwrap();
    assert_eq!(config_hash(&a), config_hash(&b));

    let c = json!({"ldap": {"url": "ldap://b", "port": 389}, "features": ["x", "y"]});
    assert_ne!(config_hash(&a), config_hash(&c));
    let reordered = json!({"ldap": {"url": "ldap://a", "port": 389}, "features": ["y", "x"]});
    assert_ne!(config_hash(&a), config_hash(&reordered));
}

#[test]
fn app_config_is_hashed_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", r#"{"site": "example", "timeout": 30}"#).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let value = load_app_config(&path).unwrap();
    assert_eq!(value["site"], "example");
    assert_eq!(app_config_hash(&path).unwrap(), config_hash(&value));
}

#[test]
fn missing_app_config_hashes_as_empty_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let hash = app_config_hash(path.to_str().unwrap()).unwrap();
    assert_eq!(hash, config_hash(&json!({})));
}

#[test]
fn server_config_defaults_fill_missing_fields() {
    let config: ServerConfig =
        serde_json::from_str(r#"{"storage_type": "directory", "directory_store_type": "file"}"#).unwrap();
    assert!(config.cluster_enabled);
    assert_eq!(config.storage_type, StorageType::Directory);
    assert_eq!(config.directory_store_type, BackendType::File);
    assert_eq!(config.table_store_type, BackendType::Redis);
    assert_eq!(config.cluster_table, "CLUSTER_STATE");
    assert_eq!(config.directory_heartbeat_seconds, 60);
    assert_eq!(config.db_node_purge_seconds, 86_400);
}

#[test]
fn instance_id_is_configured_or_generated() {
    let configured = ServerConfig {
        instance_id: Some(" web-01 ".to_string()),
        ..ServerConfig::default()
    };
    assert_eq!(configured.resolve_instance_id(), "web-01");

    let generated = ServerConfig::default().resolve_instance_id();
    assert_eq!(generated.len(), 12);
    assert_ne!(generated, ServerConfig::default().resolve_instance_id());
}

#[test]
fn environment_overrides_keep_string_ids_and_coerce_typed_fields() {
    let vars = [
        ("CLUSTER_NODE_INSTANCE_ID", "007"),
        ("CLUSTER_NODE_DB_HEARTBEAT_SECONDS", "15"),
        ("CLUSTER_NODE_CLUSTER_ENABLED", "false"),
        ("CLUSTER_NODE_STORAGE_TYPE", "directory"),
    ];
    for (key, value) in vars {
        unsafe { std::env::set_var(key, value) };
    }
    let loaded = load_server_config();
    for (key, _) in vars {
        unsafe { std::env::remove_var(key) };
    }

    let config = loaded.unwrap();
    assert_eq!(config.instance_id.as_deref(), Some("007"));
    assert_eq!(config.resolve_instance_id(), "007");
    assert_eq!(config.db_heartbeat_seconds, 15);
    assert!(!config.cluster_enabled);
    assert_eq!(config.storage_type, StorageType::Directory);
}
