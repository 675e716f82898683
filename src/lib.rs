//! flac-bridge: turns decoded FLAC frames and stream metadata into an
//! interleaved PCM stream with a negotiated audio format

pub mod audio;
pub mod config;
pub mod metadata;
pub mod ui;

/// Initialize the application directories
pub fn init_app_dirs() -> std::io::Result<()> {
    let default_path = config::Settings::default_path();
    if let Some(config_dir) = default_path.parent() {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir)?;
        }
    }
    Ok(())
}
