//! End-to-end scenarios exercising the full resolve → parse → merge → interpolate pipeline.

use liana_config::{ConfigError, ConfigurationManager, ResourceLocation};
use std::fs;

fn write(dir: &std::path::Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn defaults_scenario() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "application.yaml", "app:\n  name: Liana\n");

    let manager = ConfigurationManager::new();
    let location = ResourceLocation::builder()
        .base_directory(dir.path().to_string_lossy().to_string())
        .build();

    let config = manager.load_with_profile(&location, Some("default")).unwrap();
    assert_eq!(config.get_string("app.name").unwrap(), "Liana");
    assert_eq!(config.get_or("app.port", "8080".to_string()).unwrap(), "8080");
}

#[test]
fn profile_override_scenario() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "application.yaml", "server:\n  port: 80\n");
    write(dir.path(), "application-dev.yaml", "server:\n  port: 9090\n");

    let manager = ConfigurationManager::new();
    let location = ResourceLocation::builder()
        .base_directory(dir.path().to_string_lossy().to_string())
        .build();

    let config = manager.load_with_profile(&location, Some("dev")).unwrap();
    assert_eq!(config.get_int("server.port").unwrap(), 9090);
}

#[test]
fn array_override_scenario() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "application.yaml",
        "servers:\n  - host: a\n  - host: b\n",
    );
    write(dir.path(), "application-dev.yaml", "servers:\n  - host: c\n");

    let manager = ConfigurationManager::new();
    let location = ResourceLocation::builder()
        .base_directory(dir.path().to_string_lossy().to_string())
        .build();

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Server {
        host: String,
    }

    let config = manager.load_with_profile(&location, Some("dev")).unwrap();
    let servers: Vec<Server> = config.get_list("servers").unwrap();
    assert_eq!(
        servers,
        vec![Server {
            host: "c".to_string()
        }]
    );
}

#[test]
fn placeholder_with_default_scenario() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "application.yaml",
        "url: \"http://${host:localhost}:${port:8080}/\"\n",
    );

    let manager = ConfigurationManager::new();
    let location = ResourceLocation::builder()
        .base_directory(dir.path().to_string_lossy().to_string())
        .build();

    let config = manager.load_with_profile(&location, Some("default")).unwrap();
    assert_eq!(config.get_string("url").unwrap(), "http://localhost:8080/");
}

#[test]
fn all_or_nothing_scenario() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "application.yaml", "greeting: \"a-${x}-${y}\"\n");

    let manager = ConfigurationManager::new();
    let location = ResourceLocation::builder()
        .base_directory(dir.path().to_string_lossy().to_string())
        .variable("x", "1")
        .unwrap()
        .build();

    let config = manager.load_with_profile(&location, Some("default")).unwrap();
    assert_eq!(config.get_string("greeting").unwrap(), "a-${x}-${y}");
}

#[test]
fn per_resource_provider_prefix_scenario() {
    use liana_config::preparer::ResourcePreparer;

    let location = ResourceLocation::builder()
        .provider("classpath")
        .resource_names(["file:app.yaml", "app.json"])
        .build();

    let ids = ResourcePreparer::new(&location).prepare(None);
    assert_eq!(ids[0].provider(), "file");
    assert_eq!(ids[0].resource_name(), "app.yaml");
    assert_eq!(ids[1].provider(), "classpath");
    assert_eq!(ids[1].resource_name(), "app.json");
}

#[test]
fn cycle_scenario() {
    use liana_config::placeholder::{self, PlaceholderSpec};
    use liana_config::source::{MapSource, PropertySource};
    use std::collections::HashMap;

    let spec = PlaceholderSpec::default();
    let mut values = HashMap::new();
    values.insert("a".to_string(), "${b}".to_string());
    values.insert("b".to_string(), "${a}".to_string());
    let source = MapSource::new(values);
    let sources: Vec<&dyn PropertySource> = vec![&source];

    let result = placeholder::expand(&spec, "${a}", &sources);
    assert!(matches!(result, Err(ConfigError::InvalidPlaceholder(_))));
}
