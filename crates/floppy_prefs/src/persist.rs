use std::path::Path;

use eyre::{Result, WrapErr};
use serde::Serialize;

use crate::PREFS_FILE_FORMAT;

pub fn user_config_source(path: &Path) -> impl config::Source + Send + Sync + 'static {
    config::File::from(path.to_path_buf())
        .format(PREFS_FILE_FORMAT)
        .required(false)
}

pub fn save(path: &Path, prefs_data: &impl Serialize) -> Result<()> {
    if let Some(p) = path.parent() {
        std::fs::create_dir_all(p)
            .wrap_err_with(|| format!("error creating directory {}", p.display()))?;
    }
    let file = std::fs::File::create(path)
        .wrap_err_with(|| format!("error creating {}", path.display()))?;
    serde_norway::to_writer(file, prefs_data).wrap_err("error serializing preferences")?;
    Ok(())
}
