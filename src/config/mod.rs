// Configuration module entry point
// Layered loading (defaults -> file -> environment -> CLI) and startup validation.

mod state;
mod types;

use std::net::SocketAddr;
use std::path::Path;

use config::ConfigError;

pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig};

/// CLI overrides recognized at startup
///
/// `--bind <host:port>`, `--static-dir <path>`, `--index-file <path>`,
/// `--config <path>`. Anything else is a configuration error.
#[derive(Debug, Default, PartialEq, Eq)]
struct CliOverrides {
    config_path: Option<String>,
    bind: Option<(String, u16)>,
    static_dir: Option<String>,
    index_file: Option<String>,
}

fn parse_cli_args(args: &[String]) -> Result<CliOverrides, ConfigError> {
    let mut overrides = CliOverrides::default();
    let mut iter = args.iter();

    while let Some(flag) = iter.next() {
        let value = |flag: &str, v: Option<&String>| {
            v.cloned()
                .ok_or_else(|| ConfigError::Message(format!("{flag} requires a value")))
        };

        match flag.as_str() {
            "--config" => overrides.config_path = Some(value(flag, iter.next())?),
            "--bind" => overrides.bind = Some(parse_bind_address(&value(flag, iter.next())?)?),
            "--static-dir" => overrides.static_dir = Some(value(flag, iter.next())?),
            "--index-file" => overrides.index_file = Some(value(flag, iter.next())?),
            other => {
                return Err(ConfigError::Message(format!(
                    "Unrecognized option '{other}' (expected --bind, --static-dir, --index-file, --config)"
                )));
            }
        }
    }

    Ok(overrides)
}

/// Split a `host:port` bind address. IPv6 hosts keep their brackets.
fn parse_bind_address(bind: &str) -> Result<(String, u16), ConfigError> {
    let (host, port_str) = bind
        .rsplit_once(':')
        .ok_or_else(|| ConfigError::Message(format!("Invalid bind address '{bind}' (expected host:port)")))?;

    let port = port_str
        .parse::<u16>()
        .map_err(|e| ConfigError::Message(format!("Invalid port in bind address '{bind}': {e}")))?;

    if host.is_empty() {
        return Err(ConfigError::Message(format!(
            "Invalid bind address '{bind}' (empty host)"
        )));
    }

    Ok((host.to_string(), port))
}

impl Config {
    /// Load configuration from defaults, an optional config file, `SERVER_*`
    /// environment variables, and CLI overrides (highest precedence).
    pub fn load(args: &[String]) -> Result<Self, ConfigError> {
        let overrides = parse_cli_args(args)?;
        let config_path = overrides.config_path.as_deref().unwrap_or("config");

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVER"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("site.static_dir", "static")?
            .set_default("site.index_file", "static/index.html")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "staticd/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)?; // 10MB

        if let Some((host, port)) = overrides.bind {
            builder = builder
                .set_override("server.host", host)?
                .set_override("server.port", i64::from(port))?;
        }
        if let Some(dir) = overrides.static_dir {
            builder = builder.set_override("site.static_dir", dir)?;
        }
        if let Some(file) = overrides.index_file {
            builder = builder.set_override("site.index_file", file)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Fail-fast startup validation of the site layout.
    ///
    /// The asset directory must exist and be a directory; the root document
    /// must exist and be a regular file. Both are still read per request
    /// afterwards, so later changes take effect without a restart.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let static_dir = Path::new(&self.site.static_dir);
        if !static_dir.is_dir() {
            return Err(ConfigError::Message(format!(
                "Static asset directory '{}' does not exist or is not a directory",
                self.site.static_dir
            )));
        }

        let index_file = Path::new(&self.site.index_file);
        if !index_file.is_file() {
            return Err(ConfigError::Message(format!(
                "Index file '{}' does not exist or is not a regular file",
                self.site.index_file
            )));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::Message(format!("Invalid listen address: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_args(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::load(&[]).expect("defaults should load");
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.site.static_dir, "static");
        assert_eq!(cfg.site.index_file, "static/index.html");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.http.max_body_size, 10_485_760);
    }

    #[test]
    fn test_bind_override() {
        let cfg = Config::load(&to_args(&["--bind", "127.0.0.1:9000"])).expect("load");
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(
            cfg.socket_addr().expect("addr").to_string(),
            "127.0.0.1:9000"
        );
    }

    #[test]
    fn test_site_overrides() {
        let cfg = Config::load(&to_args(&[
            "--static-dir",
            "public",
            "--index-file",
            "public/home.html",
        ]))
        .expect("load");
        assert_eq!(cfg.site.static_dir, "public");
        assert_eq!(cfg.site.index_file, "public/home.html");
    }

    #[test]
    fn test_unknown_option_rejected() {
        assert!(Config::load(&to_args(&["--verbose"])).is_err());
    }

    #[test]
    fn test_missing_value_rejected() {
        assert!(Config::load(&to_args(&["--bind"])).is_err());
    }

    #[test]
    fn test_parse_bind_address() {
        assert_eq!(
            parse_bind_address("0.0.0.0:8080").expect("parse"),
            ("0.0.0.0".to_string(), 8080)
        );
        assert_eq!(
            parse_bind_address("[::1]:8080").expect("parse"),
            ("[::1]".to_string(), 8080)
        );
        assert!(parse_bind_address("8080").is_err());
        assert!(parse_bind_address("host:notaport").is_err());
        assert!(parse_bind_address(":8080").is_err());
    }

    #[test]
    fn test_validate_missing_static_dir() {
        let mut cfg = Config::load(&[]).expect("load");
        cfg.site.static_dir = "no-such-directory-anywhere".to_string();
        assert!(cfg.validate().is_err());
    }
}
