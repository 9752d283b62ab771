use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};

#[cfg(windows)]
const EXECUTABLE_NAME: &str = "tesseract.exe";
#[cfg(not(windows))]
const EXECUTABLE_NAME: &str = "tesseract";

/// Per-user tesseract directory: `<data_local>/chart-tooltip-scraper/tesseract`.
pub fn get_user_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chart-tooltip-scraper")
        .join("tesseract")
}

/// Finds the tesseract executable: explicit path, then a copy next to the
/// binary, then the per-user directory, then PATH.
pub fn find_tesseract_executable(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(anyhow!("Configured tesseract not found at {}", path.display()));
    }

    for dir in [crate::paths::get_tesseract_dir(), get_user_tesseract_dir()] {
        let local_exe = dir.join(EXECUTABLE_NAME);
        if local_exe.exists() {
            return Ok(local_exe);
        }
    }

    // Check PATH
    if let Ok(output) = std::process::Command::new("tesseract")
        .arg("--version")
        .output()
    {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    Err(anyhow!("Tesseract not found. Please install Tesseract-OCR."))
}

/// Finds a tessdata directory containing `<language>.traineddata`.
///
/// Returns `None` when nothing local is found, in which case tesseract falls
/// back to its compiled-in location.
pub fn find_tessdata_dir(explicit: Option<&Path>, language: &str) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let traineddata = format!("{}.traineddata", language);
    let mut candidates = vec![
        crate::paths::get_tesseract_dir().join("tessdata"),
        get_user_tesseract_dir().join("tessdata"),
    ];

    // Check TESSDATA_PREFIX environment variable
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let prefix = PathBuf::from(prefix);
        candidates.push(prefix.join("tessdata"));
        candidates.push(prefix);
    }

    candidates
        .into_iter()
        .find(|dir| dir.join(&traineddata).exists())
}
