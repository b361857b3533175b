//! `config` command: show configuration paths and values

use crate::config::ConfigLoader;
use crate::types::Result;

pub fn run_path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn run_show(as_json: bool) -> Result<()> {
    ConfigLoader::show_config(as_json)
}
