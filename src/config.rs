use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub databases: usize,
    /// A `tracing` filter directive, e.g. `info` or `zedis=debug`.
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            databases: 16,
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_args(args: &[String]) -> Self {
        let mut config = Config::default();
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--databases" => {
                    if i + 1 < args.len() {
                        if let Ok(d) = args[i + 1].parse::<usize>() {
                            if d > 0 {
                                config.databases = d;
                            }
                        }
                        i += 1;
                    }
                }
                "--loglevel" => {
                    if i + 1 < args.len() {
                        config.loglevel = args[i + 1].clone();
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        config
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key.to_lowercase().as_str() {
            "databases" => Some(self.databases.to_string()),
            "loglevel" => Some(self.loglevel.clone()),
            _ => None,
        }
    }

    /// Names of all parameters, for `CONFIG GET *`.
    pub fn keys() -> &'static [&'static str] {
        &["databases", "loglevel"]
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key.to_lowercase().as_str() {
            "loglevel" => {
                if value.is_empty() {
                    return Err("Invalid loglevel value".to_string());
                }
                self.loglevel = value.to_string();
                Ok(())
            }
            "databases" => Err(format!("can't set immutable config '{key}'")),
            _ => Err(format!("Unknown option or number of arguments for CONFIG SET - '{key}'")),
        }
    }
}

pub type SharedConfig = Arc<RwLock<Config>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_args() {
        let config = Config::from_args(&args(&["--databases", "4", "--loglevel", "debug"]));
        assert_eq!(config.databases, 4);
        assert_eq!(config.loglevel, "debug");
    }

    #[test]
    fn test_from_args_ignores_bad_values() {
        let config = Config::from_args(&args(&["--databases", "zero", "--unknown", "--databases"]));
        assert_eq!(config.databases, 16);
        let config = Config::from_args(&args(&["--databases", "0"]));
        assert_eq!(config.databases, 16);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();
        assert_eq!(config.get("DATABASES").as_deref(), Some("16"));
        assert!(config.set("loglevel", "warn").is_ok());
        assert_eq!(config.get("loglevel").as_deref(), Some("warn"));
        assert!(config.set("databases", "2").is_err());
        assert!(config.set("maxmemory", "1").is_err());
        assert_eq!(config.get("maxmemory"), None);
    }
}
