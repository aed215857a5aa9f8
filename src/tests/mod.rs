#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;
    use crate::server::ServerBuilder;
    use crate::Config;

    fn write_config(json: &str) -> (tempfile::TempDir, String) {
        let tmp_dir = tempdir().unwrap();
        let config_path = tmp_dir.path().join("config.json");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(json.as_bytes()).unwrap();
        let path = config_path.to_str().unwrap().to_string();
        (tmp_dir, path)
    }

    #[test]
    fn test_load_config() {
        let (_dir, path) = write_config(
            r#"
        {
            "serverName": "calc",
            "serverVersion": "2.0.0",
            "protocolVersion": "2024-11-05",
            "logLevel": "debug",
            "somethingElse": true
        }
        "#,
        );

        let config = Config::load_config(&path).unwrap();
        assert_eq!(config.server_name, "calc");
        assert_eq!(config.server_version, "2.0.0");
        assert_eq!(config.protocol_version, "2024-11-05");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_load_config_defaults() {
        let (_dir, path) = write_config("{}");
        let config = Config::load_config(&path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server_name, "mcp-calculator");
        assert_eq!(config.protocol_version, crate::LATEST_PROTOCOL_VERSION);
    }

    #[test]
    fn test_load_config_errors() {
        let (_dir, path) = write_config("{ not json");
        assert!(Config::load_config(&path).is_err());
        assert!(Config::load_config("/definitely/not/here.json").is_err());
    }

    #[tokio::test]
    async fn test_config_drives_initialize() {
        let (_dir, path) = write_config(r#"{"serverName": "calc", "serverVersion": "2.0.0"}"#);
        let config = Config::load_config(&path).unwrap();
        let server = ServerBuilder::from_config(&config).build().unwrap();

        let request = crate::Request::new("initialize", None, Some(1.into()));
        let response = server.handle(&request).await.unwrap();
        let result = response.result().unwrap();
        assert_eq!(result["serverInfo"]["name"], "calc");
        assert_eq!(result["serverInfo"]["version"], "2.0.0");
        assert_eq!(result["protocolVersion"], crate::LATEST_PROTOCOL_VERSION);
    }
}
