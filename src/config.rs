//! Command-line configuration for the server and client binaries.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::game::rules::Variant;
use crate::network::server::ServerConfig;

/// Variant names accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    /// Four in a row wins.
    Standard,
    /// Four in a row wins; own bottom tokens may be popped out.
    Popout,
    /// Completing three in a row loses.
    Antistack,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Standard => Variant::Standard,
            VariantArg::Popout => Variant::PopOut,
            VariantArg::Antistack => Variant::Antistack,
        }
    }
}

/// Connect Four game server
#[derive(Debug, Parser)]
#[command(name = "connect-four-server", version)]
#[command(about = "Pairs connecting players and referees Connect Four games")]
pub struct ServerArgs {
    /// Port to listen on
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Rule set for every game
    #[arg(value_enum)]
    pub variant: VariantArg,

    /// End a game when a player takes longer than this to move
    #[arg(long, value_name = "SECS")]
    pub move_timeout_secs: Option<u64>,
}

impl ServerArgs {
    /// Build the server configuration.
    pub fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::new(self.port, self.variant.into());
        config.move_timeout = self.move_timeout_secs.map(Duration::from_secs);
        config
    }
}

/// Connect Four terminal client
#[derive(Debug, Parser)]
#[command(name = "connect-four-client", version)]
#[command(about = "Plays one Connect Four game against another client")]
pub struct ClientArgs {
    /// Server host name or address
    pub host: String,

    /// Server port
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,
}
