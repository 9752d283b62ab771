//! Command-line arguments layered over the config file.

use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};

use crate::config::ScraperConfig;

/// Command-line options. Everything is optional; config.json supplies the rest.
#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub only: Vec<String>,
    pub out: Option<PathBuf>,
    pub steps: Option<u32>,
    pub debug_capture: bool,
    pub write_default_config: Option<PathBuf>,
    pub help: bool,
}

pub const HELP: &str = include_str!("cli_help.txt");

/// Parses arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(a) = args.next() {
        match a.as_str() {
            "--config" => {
                let v = args.next().ok_or_else(|| anyhow!("Missing value for --config"))?;
                parsed.config = Some(PathBuf::from(v));
            }
            "--only" => parsed
                .only
                .push(args.next().ok_or_else(|| anyhow!("Missing target name for --only"))?),
            "-o" | "--out" => {
                let v = args.next().ok_or_else(|| anyhow!("Missing output directory"))?;
                parsed.out = Some(PathBuf::from(v));
            }
            "--steps" => {
                let v = args.next().ok_or_else(|| anyhow!("Missing value for --steps"))?;
                let n: u32 = v.parse().map_err(|_| anyhow!("Invalid step count: {}", v))?;
                if n == 0 {
                    bail!("--steps must be at least 1");
                }
                parsed.steps = Some(n);
            }
            "--debug-capture" => parsed.debug_capture = true,
            "--write-default-config" => {
                parsed.write_default_config = Some(PathBuf::from(
                    args.next().ok_or_else(|| anyhow!("Missing path for --write-default-config"))?,
                ))
            }
            "-h" | "--help" => parsed.help = true,
            _ => bail!("Unknown arg: {}", a),
        }
    }

    Ok(parsed)
}

impl CliArgs {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut ScraperConfig) -> Result<()> {
        if let Some(out) = &self.out {
            config.output_dir = Some(out.clone());
        }
        if let Some(steps) = self.steps {
            config.sweep.steps = steps;
        }
        if self.debug_capture {
            config.capture.debug_capture = true;
        }
        if !self.only.is_empty() {
            for name in &self.only {
                if !config.targets.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
                    bail!("Unknown target: {}", name);
                }
            }
            config
                .targets
                .retain(|t| self.only.iter().any(|n| t.name.eq_ignore_ascii_case(n)));
        }
        Ok(())
    }
}
