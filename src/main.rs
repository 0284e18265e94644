// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vault_bridge::client::VaultClient;
use vault_bridge::command::Command;
use vault_bridge::config::load_config;

const USAGE: &str = "Usage: vault-bridge [-v|-vv] [--async] <config.yaml|config.toml> <command.json>";

/// Parsed command-line options.
struct Options {
    verbosity: u8,
    run_async: bool,
    config_path: String,
    command_path: String,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut verbosity = 0;
    let mut run_async = false;
    let mut positional = Vec::new();

    for arg in args {
        match arg.as_str() {
            "-v" => verbosity += 1,
            "-vv" => verbosity += 2,
            "--async" => run_async = true,
            flag if flag.starts_with('-') => bail!("Unknown flag '{}'\n{}", flag, USAGE),
            _ => positional.push(arg.clone()),
        }
    }

    let [config_path, command_path] = <[String; 2]>::try_from(positional)
        .map_err(|_| anyhow::anyhow!("Expected a config file and a command file\n{}", USAGE))?;

    Ok(Options {
        verbosity,
        run_async,
        config_path,
        command_path,
    })
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args)?;
    init_logging(options.verbosity);

    let config = load_config(&options.config_path)
        .with_context(|| format!("loading config {}", options.config_path))?;
    let text = fs::read_to_string(&options.command_path)
        .with_context(|| format!("reading command {}", options.command_path))?;
    let command: Command = serde_json::from_str(&text)
        .with_context(|| format!("parsing command {}", options.command_path))?;

    let client = VaultClient::from_config(&config).context("opening engine")?;

    let result: vault_bridge::errors::BridgeResult<serde_json::Value> = if options.run_async {
        let token = CancellationToken::new();
        let timeout = Duration::from_millis(config.dispatch.timeout_ms);
        let timer = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "Command timed out, cancelling");
                token.cancel();
            })
        };
        let result = client.run_command_async(&command, Some(token)).await;
        timer.abort();
        result
    } else {
        client.run_command(&command)
    };

    // Release the client before reporting, on both paths.
    client.close();

    let data = result.with_context(|| format!("running {}", command.name()))?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_positional() {
        let options = parse_args(&args(&["cfg.yaml", "cmd.json"])).unwrap();
        assert_eq!(options.config_path, "cfg.yaml");
        assert_eq!(options.command_path, "cmd.json");
        assert!(!options.run_async);
        assert_eq!(options.verbosity, 0);
    }

    #[test]
    fn test_parse_args_flags() {
        let options = parse_args(&args(&["-v", "--async", "cfg.toml", "cmd.json", "-v"])).unwrap();
        assert!(options.run_async);
        assert_eq!(options.verbosity, 2);
    }

    #[test]
    fn test_parse_args_rejects_missing_files() {
        assert!(parse_args(&args(&["cfg.yaml"])).is_err());
        assert!(parse_args(&args(&["--bogus", "a", "b"])).is_err());
    }
}
