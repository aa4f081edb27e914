//! `tango config`

use anyhow::Result;

use tango::Config;

pub(crate) fn cmd_config(config: &Config) -> Result<()> {
    println!("Config file: {}", Config::path().display());
    println!("{:#?}", config);
    Ok(())
}
