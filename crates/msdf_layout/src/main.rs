//! `msdf_layout print`        writes this target's layout manifest as TOML
//! `msdf_layout check [FILE]` verifies a pinned manifest (the shipped one
//!                            when FILE is omitted); exits non-zero on drift
//!
//! Log level comes from `MSDF_LOG` (default `info`).

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context as _, Result};
use log::{info, LevelFilter};
use msdf_sys::LayoutManifest;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Print,
    Check(Option<PathBuf>),
}

impl Command {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut args = args.into_iter();
        let cmd = match args.next().as_deref() {
            Some("print") => Command::Print,
            Some("check") => Command::Check(args.next().map(PathBuf::from)),
            Some(other) => bail!("unknown command `{other}`, expected `print` or `check`"),
            None => bail!("usage: msdf_layout <print | check [FILE]>"),
        };
        if let Some(extra) = args.next() {
            bail!("unexpected argument `{extra}`");
        }
        Ok(cmd)
    }
}

fn init_logging() -> Result<()> {
    let level = match std::env::var("MSDF_LOG") {
        Ok(s) => LevelFilter::from_str(&s).with_context(|| format!("bad MSDF_LOG value `{s}`"))?,
        Err(_) => LevelFilter::Info,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("logger already installed")?;
    Ok(())
}

fn load(path: Option<&PathBuf>) -> Result<LayoutManifest> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            LayoutManifest::from_toml_str(&text)
                .with_context(|| format!("parsing {}", path.display()))
        }
        None => match LayoutManifest::pinned() {
            Some(manifest) => Ok(manifest.context("parsing shipped manifest")?),
            None => bail!("no manifest ships for this target, pass one explicitly"),
        },
    }
}

fn run(cmd: Command) -> Result<()> {
    match cmd {
        Command::Print => {
            let text = LayoutManifest::current().to_toml_string()?;
            print!("{text}");
        }
        Command::Check(path) => {
            let manifest = load(path.as_ref())?;
            manifest.verify().context("layout drift detected")?;
            info!(
                "{} mirrored types match msdfgen {} ({}-bit)",
                manifest.types.len(),
                manifest.upstream_version,
                manifest.pointer_width
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;
    let cmd = Command::parse(std::env::args().skip(1))?;
    run(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(args(&["print"])).unwrap(), Command::Print);
        assert_eq!(Command::parse(args(&["check"])).unwrap(), Command::Check(None));
        assert_eq!(
            Command::parse(args(&["check", "m.toml"])).unwrap(),
            Command::Check(Some(PathBuf::from("m.toml")))
        );
    }

    #[test]
    fn rejects_bad_usage() {
        assert!(Command::parse(args(&[])).is_err());
        assert!(Command::parse(args(&["dump"])).is_err());
        assert!(Command::parse(args(&["print", "extra"])).is_err());
    }

    #[test]
    fn check_passes_for_current_manifest_file() {
        let path = std::env::temp_dir().join(format!("msdf_layout_{}.toml", std::process::id()));
        let text = LayoutManifest::current().to_toml_string().unwrap();
        std::fs::write(&path, text).unwrap();
        let result = run(Command::Check(Some(path.clone())));
        let _ = std::fs::remove_file(&path);
        result.unwrap();
    }

    #[test]
    fn check_fails_on_drifted_manifest() {
        let mut manifest = LayoutManifest::current();
        manifest.types[0].size += 8;
        let path = std::env::temp_dir().join(format!("msdf_layout_drift_{}.toml", std::process::id()));
        std::fs::write(&path, manifest.to_toml_string().unwrap()).unwrap();
        let result = run(Command::Check(Some(path.clone())));
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }
}
