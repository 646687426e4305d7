//! Layered configuration: defaults, TOML file, `ARB_` environment, flags

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, Map};

use arb_core::ExecutorConfig;

use crate::cli::Cli;

const ENV_PREFIX: &str = "ARB";

/// `ARB_RPC_URL`, `ARB_BROADCAST__RETRY_ROUNDS`, ...
fn environment(vars: Option<Map<String, String>>) -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .source(vars)
}

fn resolve(builder: ConfigBuilder<DefaultState>) -> Result<ExecutorConfig, ConfigError> {
    builder.build()?.try_deserialize()
}

pub fn load(cli: &Cli) -> Result<ExecutorConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(
            File::from(cli.config.as_path())
                .format(FileFormat::Toml)
                .required(false),
        )
        .add_source(environment(None));

    let mut config = resolve(builder)?;
    cli.apply(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use arb_core::ProfitCheckMode;

    const FILE: &str = r#"
        rpc_url = "http://file:8545"
        node_address = "0x1111111111111111111111111111111111111111"
        profit_check = "disabled"
        builder_command = "./bundle.sh"

        [broadcast]
        retry_rounds = 5
    "#;

    #[test]
    fn test_empty_sources_give_defaults() {
        let config = resolve(Config::builder()).unwrap();
        assert_eq!(config, ExecutorConfig::default());
    }

    #[test]
    fn test_file_layer() {
        let builder = Config::builder().add_source(File::from_str(FILE, FileFormat::Toml));
        let config = resolve(builder).unwrap();

        assert_eq!(config.rpc_url, "http://file:8545");
        assert_eq!(config.node_address, Address::repeat_byte(0x11));
        assert_eq!(config.profit_check, ProfitCheckMode::Disabled);
        assert_eq!(config.broadcast.retry_rounds, 5);
        assert_eq!(config.broadcast.inclusion_timeout_secs, 60);
    }

    #[test]
    fn test_environment_overrides_file() {
        let vars = Map::from([
            ("ARB_RPC_URL".to_string(), "http://env:8545".to_string()),
            ("ARB_DRY_RUN".to_string(), "true".to_string()),
            ("ARB_BROADCAST__INCLUSION_TIMEOUT_SECS".to_string(), "30".to_string()),
        ]);
        let builder = Config::builder()
            .add_source(File::from_str(FILE, FileFormat::Toml))
            .add_source(environment(Some(vars)));

        let config = resolve(builder).unwrap();

        assert_eq!(config.rpc_url, "http://env:8545");
        assert!(config.dry_run);
        assert_eq!(config.broadcast.inclusion_timeout_secs, 30);
        assert_eq!(config.broadcast.retry_rounds, 5);
        assert_eq!(config.builder_command, "./bundle.sh");
    }
}
