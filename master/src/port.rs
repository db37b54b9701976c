use std::fs;
use std::io::Result;
use std::path::{Path, PathBuf};

use log::info;
use serial2::SerialPort;

use crate::config::SerialConfig;

#[cfg(not(target_os = "windows"))]
static DEFAULT_PATH: &str = "/dev/ttyUSB0";
#[cfg(target_os = "windows")]
static DEFAULT_PATH: &str = "COM3";

/// Device name prefixes tried in order, USB serial adapters first.
const DEVICE_PREFIXES: [&str; 2] = ["ttyUSB", "ttyACM"];

/// Open the controller's serial port and drop anything already buffered.
pub fn open(config: &SerialConfig) -> Result<SerialPort> {
    let path = config.path.clone().unwrap_or_else(discover);
    info!("opening {} at {} baud", path.display(), config.baud_rate);

    let mut port = SerialPort::open(&path, config.baud_rate)?;
    // Needed for windows, but should not hurt on Linux
    port.set_dtr(true)?;
    port.set_rts(true)?;
    port.set_write_timeout(config.timeout())?;
    port.set_read_timeout(config.timeout())?;
    port.discard_buffers()?;

    Ok(port)
}

/// Best guess at the controller's device path.
pub fn discover() -> PathBuf {
    find_device(Path::new("/dev")).unwrap_or_else(|| PathBuf::from(DEFAULT_PATH))
}

/// First `ttyUSB*` entry of `dir`, else the first `ttyACM*`.
pub fn find_device(dir: &Path) -> Option<PathBuf> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok()?.file_name().into_string().ok())
        .collect();
    names.sort();

    DEVICE_PREFIXES
        .iter()
        .find_map(|prefix| names.iter().find(|name| name.starts_with(prefix)))
        .map(|name| dir.join(name))
}
