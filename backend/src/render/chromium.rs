//! Headless Chromium/Chrome as a `PdfEngine`.
//!
//! Every call starts a fresh browser with a throw-away profile inside a
//! private temporary directory, loads the document from a local file and lets
//! the browser print it with `--print-to-pdf`.

use crate::render::{PdfEngine, PrintOptions, RenderError};
use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

/// Milliseconds of virtual time the page gets to settle before printing.
const SETTLE_BUDGET_MS: u32 = 10_000;

pub struct ChromiumEngine {
    binary: PathBuf,
}

impl ChromiumEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    fn arguments(&self, workdir: &Path, page: &Path, output: &Path, options: &PrintOptions) -> Vec<String> {
        let mut args = vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--no-first-run".to_string(),
            "--disable-extensions".to_string(),
            "--disable-background-networking".to_string(),
            "--hide-scrollbars".to_string(),
            "--mute-audio".to_string(),
            "--no-pdf-header-footer".to_string(),
            "--print-to-pdf-no-header".to_string(),
            "--run-all-compositor-stages-before-draw".to_string(),
            format!("--virtual-time-budget={}", SETTLE_BUDGET_MS),
            format!("--user-data-dir={}", workdir.join("profile").display()),
            format!("--print-to-pdf={}", output.display()),
        ];
        if !options.print_background {
            args.push("--disable-print-background".to_string());
        }
        args.push(format!("file://{}", page.display()));
        args
    }
}

/// A running browser process and its scratch directory.
///
/// Dropping the guard kills the process if it is still alive, then removes
/// the directory.
struct BrowserInstance {
    child: Child,
    _workdir: TempDir,
}

impl Drop for BrowserInstance {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            debug!("killing unfinished browser instance {:?}", self.child.id());
            let _ = self.child.start_kill();
        }
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[async_trait]
impl PdfEngine for ChromiumEngine {
    async fn print_pdf(&self, html: &str, options: &PrintOptions) -> Result<Vec<u8>, RenderError> {
        let workdir = tempfile::Builder::new().prefix("docuform-render-").tempdir()?;
        let page = workdir.path().join("page.html");
        let output = workdir.path().join("output.pdf");
        tokio::fs::write(&page, html).await?;

        let child = Command::new(&self.binary)
            .args(self.arguments(workdir.path(), &page, &output, options))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(RenderError::Launch)?;
        let mut instance = BrowserInstance {
            child,
            _workdir: workdir,
        };

        let stdout = instance.child.stdout.take();
        let stderr = instance.child.stderr.take();
        let (status, stdout, stderr) = tokio::join!(instance.child.wait(), read_pipe(stdout), read_pipe(stderr));
        let status = status?;
        if !stdout.is_empty() {
            debug!("browser stdout: {}", stdout.trim_end());
        }
        if !stderr.is_empty() {
            debug!("browser stderr: {}", stderr.trim_end());
        }
        if !status.success() {
            return Err(RenderError::Engine {
                status: status.to_string(),
                stderr: stderr.trim_end().to_string(),
            });
        }

        match tokio::fs::read(&output).await {
            Ok(bytes) if bytes.is_empty() => Err(RenderError::EmptyOutput),
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(RenderError::EmptyOutput),
            Err(e) => Err(e.into()),
        }
    }
}
