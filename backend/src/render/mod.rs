//! # Render Pipeline
//!
//! Turns a template module's themed HTML into PDF bytes:
//!
//! 1. resolve the module by slug (`NotFound` when unknown);
//! 2. populate every theme and pick the requested one (`BadRequest` when the
//!    theme does not exist);
//! 3. inject the page-format rules and hand the document to a `PdfEngine`
//!    under a deadline (`RenderTimeout` when it expires).
//!
//! Each call gets its own engine instance. The instance lives inside the
//! engine future, so dropping that future on timeout or error releases it.

pub mod chromium;

use crate::error::AppError;
use crate::registry::TemplateRegistry;
use async_trait::async_trait;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    A4,
    Letter,
}

impl PageFormat {
    fn css_size(self) -> &'static str {
        match self {
            PageFormat::A4 => "A4",
            PageFormat::Letter => "letter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    pub page: PageFormat,
    pub print_background: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            page: PageFormat::A4,
            print_background: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to launch rendering engine: {0}")]
    Launch(std::io::Error),
    #[error("rendering engine exited with {status}: {stderr}")]
    Engine { status: String, stderr: String },
    #[error("I/O error while rendering: {0}")]
    Io(#[from] std::io::Error),
    #[error("rendering engine produced no output")]
    EmptyOutput,
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err.to_string())
    }
}

/// Something that prints a complete, self-contained HTML document to PDF.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn print_pdf(&self, html: &str, options: &PrintOptions) -> Result<Vec<u8>, RenderError>;
}

/// Adds the `@page` rule that fixes the physical page size, placed last in
/// `<head>` so it wins over template styles.
fn with_page_rules(html: &str, options: &PrintOptions) -> String {
    let mut style = format!(
        "<style>@page {{ size: {}; margin: 12mm 0; }}",
        options.page.css_size()
    );
    if options.print_background {
        style.push_str(" html, body { -webkit-print-color-adjust: exact; print-color-adjust: exact; }");
    }
    style.push_str("</style>");

    match html.find("</head>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + style.len());
            out.push_str(&html[..pos]);
            out.push_str(&style);
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{}{}", style, html),
    }
}

#[derive(Clone)]
pub struct RenderPipeline {
    engine: Arc<dyn PdfEngine>,
    timeout: Duration,
    options: PrintOptions,
}

impl RenderPipeline {
    pub fn new(engine: Arc<dyn PdfEngine>, timeout: Duration) -> Self {
        Self {
            engine,
            timeout,
            options: PrintOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PrintOptions) -> Self {
        self.options = options;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Populates the `theme` variant of the `slug` module with `values` and
    /// prints it.
    pub async fn render(
        &self,
        registry: &TemplateRegistry,
        slug: &str,
        theme: &str,
        values: &HashMap<String, String>,
    ) -> Result<Vec<u8>, AppError> {
        let module = registry
            .get(slug)
            .ok_or_else(|| AppError::NotFound(format!("Document type '{}' not found.", slug)))?;
        let mut themes = module.generate(values);
        let html = themes
            .remove(theme)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid theme '{}'.", theme)))?;
        self.print(&html).await
    }

    /// Prints a complete HTML document under the pipeline deadline.
    pub async fn print(&self, html: &str) -> Result<Vec<u8>, AppError> {
        let document = with_page_rules(html, &self.options);
        let started = Instant::now();
        match tokio::time::timeout(self.timeout, self.engine.print_pdf(&document, &self.options)).await {
            Ok(Ok(bytes)) if bytes.is_empty() => Err(RenderError::EmptyOutput.into()),
            Ok(Ok(bytes)) => {
                info!("PDF rendered: {} bytes in {:?}", bytes.len(), started.elapsed());
                Ok(bytes)
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                debug!("render deadline of {:?} expired, engine instance dropped", self.timeout);
                Err(AppError::RenderTimeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEngine {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PdfEngine for RecordingEngine {
        async fn print_pdf(&self, html: &str, _options: &PrintOptions) -> Result<Vec<u8>, RenderError> {
            self.seen.lock().unwrap().push(html.to_string());
            Ok(b"%PDF-1.7 fake".to_vec())
        }
    }

    /// Holds a live-instance slot until dropped.
    struct InstanceSlot(Arc<AtomicUsize>);

    impl Drop for InstanceSlot {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    struct StallingEngine {
        live: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PdfEngine for StallingEngine {
        async fn print_pdf(&self, _html: &str, _options: &PrintOptions) -> Result<Vec<u8>, RenderError> {
            self.live.fetch_add(1, Ordering::SeqCst);
            let _slot = InstanceSlot(Arc::clone(&self.live));
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    struct BrokenEngine;

    #[async_trait]
    impl PdfEngine for BrokenEngine {
        async fn print_pdf(&self, _html: &str, _options: &PrintOptions) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Engine {
                status: "exit status: 1".into(),
                stderr: "crashed".into(),
            })
        }
    }

    fn values() -> HashMap<String, String> {
        HashMap::from([("authorName".to_string(), "Ada Lovelace".to_string())])
    }

    #[actix_web::test]
    async fn renders_requested_theme_with_page_rules() {
        let engine = Arc::new(RecordingEngine::default());
        let pipeline = RenderPipeline::new(engine.clone(), Duration::from_secs(5));
        let bytes = pipeline
            .render(&TemplateRegistry::builtin(), "resignation-letter", "modern", &values())
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let seen = engine.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("Ada Lovelace"));
        assert!(seen[0].contains("@page { size: A4;"));
        let style_at = seen[0].find("@page").unwrap();
        assert!(style_at < seen[0].find("</head>").unwrap());
    }

    #[actix_web::test]
    async fn unknown_slug_and_theme_fail_before_the_engine_runs() {
        let engine = Arc::new(RecordingEngine::default());
        let pipeline = RenderPipeline::new(engine.clone(), Duration::from_secs(5));
        let registry = TemplateRegistry::builtin();

        let err = pipeline.render(&registry, "no-such-doc", "classic", &values()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = pipeline
            .render(&registry, "resignation-letter", "neon", &values())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("neon")));

        assert!(engine.seen.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn deadline_expiry_times_out_and_releases_the_instance() {
        let live = Arc::new(AtomicUsize::new(0));
        let pipeline = RenderPipeline::new(
            Arc::new(StallingEngine { live: live.clone() }),
            Duration::from_millis(50),
        );
        let err = pipeline
            .render(&TemplateRegistry::builtin(), "resignation-letter", "classic", &values())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RenderTimeout(_)));
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn engine_failure_is_a_render_error() {
        let pipeline = RenderPipeline::new(Arc::new(BrokenEngine), Duration::from_secs(5));
        let err = pipeline.print("<html><head></head><body></body></html>").await.unwrap_err();
        assert!(matches!(err, AppError::Render(ref m) if m.contains("crashed")));
    }

    #[test]
    fn page_rules_without_head_are_prepended() {
        let options = PrintOptions {
            page: PageFormat::Letter,
            print_background: false,
        };
        let out = with_page_rules("<p>hi</p>", &options);
        assert!(out.starts_with("<style>@page { size: letter;"));
        assert!(!out.contains("print-color-adjust"));
        assert!(out.ends_with("<p>hi</p>"));
    }
}
