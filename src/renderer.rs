//! Renderer process adapter

use crate::Result;
use log::debug;
use std::path::Path;
use std::process::{Command, Stdio};

/// Outcome of one renderer run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendererRun {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    /// Captured standard error, kept for failure reports
    pub stderr: String,
}

/// Something that executes a control script with a renderer binary
///
/// Implementations block until the renderer has finished.
pub trait Renderer {
    fn render(&self, binary: &Path, options: &[String], script: &Path) -> Result<RendererRun>;
}

/// Runs a PhantomJS-compatible binary as a child process:
/// `<binary> <options...> <script>`
///
/// Arguments are passed directly to the process without a shell, so no value
/// is subject to word splitting or expansion.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhantomJs;

impl Renderer for PhantomJs {
    fn render(&self, binary: &Path, options: &[String], script: &Path) -> Result<RendererRun> {
        debug!(
            "running renderer: {} {} {}",
            binary.display(),
            options.join(" "),
            script.display()
        );

        let output = Command::new(binary)
            .args(options)
            .arg(script)
            .stdin(Stdio::null())
            .output()?;

        Ok(RendererRun {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_status_and_stderr() {
        // `sh <script>` stands in for the renderer: options first, script last
        let mut script = tempfile::Builder::new().suffix(".sh").tempfile().unwrap();
        std::io::Write::write_all(&mut script, b"echo boom >&2\nexit 3\n").unwrap();

        let run = PhantomJs
            .render(Path::new("/bin/sh"), &["-e".to_string()], script.path())
            .unwrap();
        assert_eq!(run.status, Some(3));
        assert_eq!(run.stderr.trim(), "boom");
    }

    #[test]
    fn missing_binary_is_io_error() {
        let err = PhantomJs
            .render(Path::new("/nonexistent/phantomjs"), &[], Path::new("x.js"))
            .unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
