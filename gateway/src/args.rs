use std::{io::IsTerminal, net::SocketAddr, path::PathBuf};

use clap::Parser;
use tracing::Subscriber;
use tracing_subscriber::{registry::LookupSpan, Layer};

mod log;

pub(crate) use log::{LogLevel, LogStyle};

pub(crate) type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

#[derive(Debug, Parser)]
#[command(name = "The Cosmos GraphQL Gateway", version)]
/// A GraphQL gateway over an Azure Cosmos DB container
pub(crate) struct Args {
    /// IP address on which the server will listen for incoming connections. Defaults to 127.0.0.1:5000.
    #[arg(short, long, env = "COSMOS_GRAPHQL_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,
    /// Path to the TOML configuration file. The gateway runs without one.
    #[arg(long, short, env = "COSMOS_GRAPHQL_CONFIG_PATH", default_value = "./cosmos-graphql.toml")]
    pub config: PathBuf,
    /// Cosmos DB account endpoint
    #[arg(long, env = "CosmosURL")]
    pub cosmos_url: Option<String>,
    /// Cosmos DB master key, base64 encoded
    #[arg(long, env = "CosmosKey", hide_env_values = true)]
    pub cosmos_key: Option<String>,
    /// Cosmos DB database name
    #[arg(long, env = "CosmosDatabase")]
    pub cosmos_database: Option<String>,
    /// Cosmos DB container name
    #[arg(long, env = "CosmosContainer")]
    pub cosmos_container: Option<String>,
    /// Name of the document field the container is partitioned on
    #[arg(long, env = "CosmosPartitionKey")]
    pub cosmos_partition_key: Option<String>,
    /// Keep documents in process memory instead of Cosmos DB. For local development only.
    #[arg(long)]
    pub in_memory: bool,
    /// Set the logging level
    #[arg(long = "log", env = "COSMOS_GRAPHQL_LOG")]
    pub log_level: Option<LogLevel>,
    /// Set the style of log output
    #[arg(long, env = "COSMOS_GRAPHQL_LOG_STYLE", default_value_t = LogStyle::Text)]
    pub log_style: LogStyle,
}

impl Args {
    pub fn log_format<S>(&self) -> BoxedLayer<S>
    where
        S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
    {
        let layer = tracing_subscriber::fmt::layer();

        match self.log_style {
            // for interactive terminals we provide colored output
            LogStyle::Text if std::io::stdout().is_terminal() => layer.with_ansi(true).boxed(),
            // for server logs, colors are off
            LogStyle::Text => layer.with_ansi(false).boxed(),
            LogStyle::Json => layer.json().boxed(),
        }
    }
}

pub(crate) fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(args: &[&str]) -> Args {
        let vars = [
            ("CosmosURL", None::<&str>),
            ("CosmosKey", None),
            ("CosmosDatabase", None),
            ("CosmosContainer", None),
            ("CosmosPartitionKey", None),
            ("COSMOS_GRAPHQL_LISTEN_ADDRESS", None),
            ("COSMOS_GRAPHQL_CONFIG_PATH", None),
            ("COSMOS_GRAPHQL_LOG", None),
            ("COSMOS_GRAPHQL_LOG_STYLE", None),
        ];

        temp_env::with_vars(vars, || Args::try_parse_from(args).unwrap())
    }

    #[test]
    fn defaults() {
        let args = parse_from(&["cosmos-graphql-gateway"]);

        assert_eq!(args.listen_address, None);
        assert_eq!(args.config, PathBuf::from("./cosmos-graphql.toml"));
        assert_eq!(args.log_level, None);
        assert_eq!(args.log_style, LogStyle::Text);
        assert!(!args.in_memory);
    }

    #[test]
    fn flags() {
        let args = parse_from(&[
            "cosmos-graphql-gateway",
            "--listen-address",
            "0.0.0.0:8080",
            "--log",
            "debug",
            "--log-style",
            "json",
            "--in-memory",
            "--cosmos-partition-key",
            "city",
        ]);

        assert_eq!(args.listen_address, Some("0.0.0.0:8080".parse().unwrap()));
        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert_eq!(args.log_style, LogStyle::Json);
        assert!(args.in_memory);
        assert_eq!(args.cosmos_partition_key.as_deref(), Some("city"));
    }

    #[test]
    fn cosmos_settings_from_env() {
        let vars = [
            ("CosmosURL", Some("https://acme.documents.azure.com:443/")),
            ("CosmosKey", Some("c2VjcmV0")),
            ("CosmosDatabase", Some("db")),
            ("CosmosContainer", Some("items")),
            ("CosmosPartitionKey", Some("city")),
        ];

        let args = temp_env::with_vars(vars, || Args::try_parse_from(["cosmos-graphql-gateway"]).unwrap());

        assert_eq!(args.cosmos_url.as_deref(), Some("https://acme.documents.azure.com:443/"));
        assert_eq!(args.cosmos_key.as_deref(), Some("c2VjcmV0"));
        assert_eq!(args.cosmos_database.as_deref(), Some("db"));
        assert_eq!(args.cosmos_container.as_deref(), Some("items"));
        assert_eq!(args.cosmos_partition_key.as_deref(), Some("city"));
    }
}
