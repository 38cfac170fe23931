
//! Reduce truecolor images to a palette, for indexed color formats.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};


/// Converts a PNG image to a palette based PNG image with at most the specified number of colors.
pub trait Quantizer {

    /// Return the bytes of a palette based PNG image with at most `colors` palette entries.
    fn quantize(&self, png: &[u8], colors: usize) -> Result<Vec<u8>>;
}

/// Any closure can quantize, which is mostly useful for tests.
impl<F> Quantizer for F where F: Fn(&[u8], usize) -> Result<Vec<u8>> {
    fn quantize(&self, png: &[u8], colors: usize) -> Result<Vec<u8>> {
        self(png, colors)
    }
}


/// Runs the `pngquant` executable as a subprocess.
/// The image is piped through standard input and output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngQuant {

    /// The executable to run. Defaults to `pngquant`, which is looked up in the `PATH`.
    pub executable: PathBuf,

    /// Whether to apply Floyd-Steinberg dithering.
    pub dither: bool,
}

impl Default for PngQuant {
    fn default() -> Self {
        PngQuant { executable: PathBuf::from("pngquant"), dither: true }
    }
}

impl PngQuant {

    /// Use the specified executable.
    pub fn with_executable(self, executable: impl Into<PathBuf>) -> Self {
        PngQuant { executable: executable.into(), ..self }
    }

    /// Enable or disable dithering.
    pub fn with_dither(self, dither: bool) -> Self {
        PngQuant { dither, ..self }
    }
}

impl Quantizer for PngQuant {
    fn quantize(&self, png: &[u8], colors: usize) -> Result<Vec<u8>> {
        let mut command = Command::new(&self.executable);
        if !self.dither { command.arg("--nofs"); }

        command.arg(colors.to_string()).arg("--force").arg("-")
            .stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());

        log::debug!("running {:?}", command);

        let mut child = command.spawn()
            .map_err(|error| Error::external("pngquant", format!("cannot run {}: {}", self.executable.display(), error)))?;

        let mut stdin = child.stdin.take()
            .ok_or_else(|| Error::external("pngquant", "standard input is not available"))?;

        // a separate thread feeds the input, so that a full output pipe cannot block the child
        let input = png.to_vec();
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        let output = child.wait_with_output()
            .map_err(|error| Error::external("pngquant", error.to_string()))?;

        let written = writer.join()
            .map_err(|_| Error::external("pngquant", "writing the input panicked"))?;

        if !output.status.success() {
            return Err(Error::external("pngquant", format!(
                "{}: {}", output.status, String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        written.map_err(|error| Error::external("pngquant", error.to_string()))?;
        Ok(output.stdout)
    }
}
