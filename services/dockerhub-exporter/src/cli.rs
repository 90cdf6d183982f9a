//! Command-line flags
//!
//! Flags may be written with one or two dashes, and values either as the
//! next argument or after `=` (`-port 9090`, `--port=9090`).

use crate::error::{Error, Result};

/// Parsed command line. Every field is optional; unset values fall through
/// to env, config file and defaults.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Cli {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub version: bool,
    pub help: bool,
}

impl Cli {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cli = Cli::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
                return Err(Error::Usage(format!("unexpected argument {arg:?}")));
            };
            let (name, inline) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };

            match name {
                "config" => cli.config = Some(take_value(name, inline, &mut args)?),
                "port" => {
                    let raw = take_value(name, inline, &mut args)?;
                    let port = raw
                        .parse::<u16>()
                        .map_err(|e| Error::Usage(format!("invalid -port {raw:?}: {e}")))?;
                    cli.port = Some(port);
                }
                "path" => cli.path = Some(take_value(name, inline, &mut args)?),
                "user" => cli.user = Some(take_value(name, inline, &mut args)?),
                "pass" => cli.pass = Some(take_value(name, inline, &mut args)?),
                "version" => cli.version = switch(name, inline)?,
                "h" | "help" => cli.help = switch(name, inline)?,
                _ => return Err(Error::Usage(format!("unknown flag -{name}"))),
            }
        }

        Ok(cli)
    }
}

fn take_value(
    name: &str,
    inline: Option<&str>,
    rest: &mut impl Iterator<Item = String>,
) -> Result<String> {
    match inline {
        Some(value) => Ok(value.to_owned()),
        None => rest
            .next()
            .ok_or_else(|| Error::Usage(format!("flag -{name} needs a value"))),
    }
}

fn switch(name: &str, inline: Option<&str>) -> Result<bool> {
    match inline {
        None => Ok(true),
        Some(value) => value
            .parse()
            .map_err(|_| Error::Usage(format!("invalid boolean for -{name}: {value:?}"))),
    }
}

/// Help text printed for `-h` and on argument errors.
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [flags]\n\
         \n  -config string\n\tPath to a TOML config file (env CONFIG_PATH)\
         \n  -port int\n\tPort to listen on (default 9090)\
         \n  -path string\n\tPath to expose metrics on (default \"/metrics\")\
         \n  -user string\n\tOptional username to authenticate with (env DOCKERHUB_USERNAME)\
         \n  -pass string\n\tOptional passphrase to authenticate with (env DOCKERHUB_PASSPHRASE)\
         \n  -version\n\tDisplay version and exit\
         \n  -h, -help\n\tDisplay this help message\n"
    )
}
