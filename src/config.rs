//! Command line and environment configuration

use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::net::SocketAddr;

use crate::service::DEFAULT_MAX_QUANTITY;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";

fn pack_sizes_arg() -> Arg {
    Arg::new("pack-sizes")
        .long("pack-sizes")
        .help("Comma separated pack sizes, e.g. 250,500,1000")
        .value_delimiter(',')
        .value_parser(value_parser!(i64).range(1..))
}

pub fn cli() -> Command {
    Command::new("pack-calculator")
        .about("Works out which whole packs to ship for an order")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP API")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .help("Address to bind")
                        .default_value(DEFAULT_HOST)
                        .value_parser(value_parser!(String)),
                )
                .arg(
                    Arg::new("port")
                        .long("port")
                        .help("Port to listen on")
                        .env("PORT")
                        .default_value("8080")
                        .value_parser(value_parser!(u16)),
                )
                .arg(pack_sizes_arg().help("(Optional) Pack sizes to start with; otherwise set them via PUT /api/pack-sizes"))
                .arg(
                    Arg::new("max-quantity")
                        .long("max-quantity")
                        .help("Largest quantity a single calculation may ask for")
                        .default_value("10000000")
                        .value_parser(value_parser!(i64).range(1..)),
                ),
        )
        .subcommand(
            Command::new("calculate")
                .about("Calculate a single order and print the result")
                .arg(
                    Arg::new("QUANTITY")
                        .help("Number of items ordered")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(pack_sizes_arg().required(true))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the result as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Settings for `serve`
#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub pack_sizes: Vec<i64>,
    pub max_quantity: i64,
}

impl ServerConfig {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        ServerConfig {
            host: matches
                .get_one::<String>("host")
                .cloned()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: matches.get_one::<u16>("port").copied().unwrap_or(DEFAULT_PORT),
            pack_sizes: matches
                .get_many::<i64>("pack-sizes")
                .map(|sizes| sizes.copied().collect())
                .unwrap_or_default(),
            max_quantity: matches
                .get_one::<i64>("max-quantity")
                .copied()
                .unwrap_or(DEFAULT_MAX_QUANTITY),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    /// Base URL advertised in the API documentation
    pub fn public_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

/// Settings for `calculate`
#[derive(Clone, Debug, PartialEq)]
pub struct CalculateConfig {
    pub quantity: i64,
    pub pack_sizes: Vec<i64>,
    pub json: bool,
}

impl CalculateConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let quantity = matches
            .get_one::<i64>("QUANTITY")
            .copied()
            .ok_or_else(|| anyhow!("QUANTITY is required"))?;
        let pack_sizes: Vec<i64> = matches
            .get_many::<i64>("pack-sizes")
            .map(|sizes| sizes.copied().collect())
            .unwrap_or_default();

        Ok(CalculateConfig {
            quantity,
            pack_sizes,
            json: matches.get_flag("json"),
        })
    }
}
