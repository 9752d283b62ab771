use anyhow::{Context, Result, anyhow};
use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use super::TextRecognizer;
use super::setup::{find_tessdata_dir, find_tesseract_executable};
use crate::config::OcrConfig;

/// Runs the tesseract CLI once per raster, reading plain text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    executable: PathBuf,
    tessdata: Option<PathBuf>,
    language: String,
    page_segmentation_mode: u8,
}

impl TesseractRecognizer {
    /// Locates tesseract and its data. Fails if no executable is found.
    pub fn from_config(config: &OcrConfig) -> Result<Self> {
        let executable = find_tesseract_executable(config.tesseract_path.as_deref())?;
        let tessdata = find_tessdata_dir(config.tessdata_dir.as_deref(), &config.language);

        tracing::info!("Using tesseract at {}", executable.display());
        if let Some(dir) = &tessdata {
            tracing::info!("Using tessdata at {}", dir.display());
        }

        Ok(Self {
            executable,
            tessdata,
            language: config.language.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
        })
    }

    fn command(&self, input: &std::path::Path) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg(input).arg("stdout");
        if let Some(dir) = &self.tessdata {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        cmd.arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string());
        cmd
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&mut self, raster: &GrayImage) -> Result<String> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        raster
            .save(temp_input.path())
            .context("Failed to write OCR input image")?;

        let output = self
            .command(temp_input.path())
            .output()
            .with_context(|| format!("Failed to run {}", self.executable.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
