//! [`DocumentEngine`] on top of pdfium.
//!
//! Document space is PDF user space: points, origin at the bottom-left of
//! the page. Page-local space has its origin at the top-left, so the two
//! differ by a vertical flip.

mod text;

use std::collections::HashMap;
use std::convert::TryFrom;
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use parking_lot::Mutex;
use pdfium_render::prelude::*;
use pdfpick_core::{
    DocumentEngine, DocumentPoint, DocumentRect, Link, PagePoint, PageSize, PixelSize, TextSpan,
    Tolerance, WordSpan,
};
use tracing::{debug, instrument, warn};

pub use text::{PageText, TextChar};

/// Environment variable naming an explicit pdfium shared library.
pub const PDFIUM_LIBRARY_ENV: &str = "PDFPICK_PDFIUM_LIBRARY_PATH";

pub struct PdfiumEngineFactory {
    pdfium: Arc<Pdfium>,
}

impl PdfiumEngineFactory {
    pub fn new() -> Result<Self> {
        let pdfium = match bind_pdfium_from_env() {
            Some(pdfium) => pdfium,
            None => bind_pdfium_default()?,
        };
        Ok(Self {
            pdfium: Arc::new(pdfium),
        })
    }

    pub fn open(&self, path: &Path) -> Result<PdfiumEngine> {
        let absolute = path
            .canonicalize()
            .with_context(|| format!("failed to resolve path for {:?}", path))?;
        let page_sizes = read_page_sizes(&self.pdfium, &absolute)?;
        debug!(path = %absolute.display(), pages = page_sizes.len(), "opened document");
        Ok(PdfiumEngine::new(
            Arc::clone(&self.pdfium),
            absolute,
            page_sizes,
        ))
    }
}

pub struct PdfiumEngine {
    // Declared before `pdfium` so it is dropped first; see `open_document`.
    document: Mutex<Option<PdfDocument<'static>>>,
    pdfium: Arc<Pdfium>,
    path: PathBuf,
    page_sizes: Vec<PageSize>,
    text: Mutex<HashMap<usize, Arc<PageText>>>,
}

impl PdfiumEngine {
    fn new(pdfium: Arc<Pdfium>, path: PathBuf, page_sizes: Vec<PageSize>) -> Self {
        Self {
            document: Mutex::new(None),
            pdfium,
            path,
            page_sizes,
            text: Mutex::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_document(&self) -> Result<PdfDocument<'static>> {
        let document = self
            .pdfium
            .load_pdf_from_file(&self.path, None)
            .with_context(|| format!("failed to open {:?}", self.path))?;
        // SAFETY: the document borrows the bindings owned by `self.pdfium`. It is only ever
        // stored in `self.document`, which is declared before `pdfium` and therefore dropped
        // first, so the borrow never outlives the bindings.
        let document = unsafe { mem::transmute::<PdfDocument<'_>, PdfDocument<'static>>(document) };
        Ok(document)
    }

    fn with_document<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&PdfDocument<'static>) -> Result<R>,
    {
        let mut guard = self.document.lock();
        if guard.is_none() {
            let document = self.open_document()?;
            *guard = Some(document);
        }
        match guard.as_ref() {
            Some(document) => f(document),
            None => Err(anyhow!("document {:?} is not loaded", self.path)),
        }
    }

    /// Character geometry for `page`, extracted on first use.
    pub fn page_text(&self, page: usize) -> Option<Arc<PageText>> {
        if page >= self.page_sizes.len() {
            return None;
        }
        if let Some(cached) = self.text.lock().get(&page) {
            return Some(Arc::clone(cached));
        }

        match self.with_document(|document| extract_page_text(document, page)) {
            Ok(text) => {
                let text = Arc::new(text);
                self.text.lock().insert(page, Arc::clone(&text));
                Some(text)
            }
            Err(err) => {
                warn!(
                    ?err,
                    page,
                    path = %self.path.display(),
                    "failed to extract page text"
                );
                None
            }
        }
    }

    #[instrument(skip(self))]
    fn page_links(&self, page_index: usize) -> Result<Vec<Link>> {
        self.with_document(|document| {
            let page = load_page(document, page_index)?;
            let mut links = Vec::new();
            for link in page.links().iter() {
                let rect = match link.rect() {
                    Ok(rect) => rect,
                    Err(err) => {
                        warn!(
                            ?err,
                            page = page_index,
                            path = %self.path.display(),
                            "failed to resolve link rectangle"
                        );
                        continue;
                    }
                };
                let bounds = document_rect(&rect);
                if let Some(link) = link_from_pdfium(&link, bounds) {
                    links.push(link);
                }
            }
            Ok(links)
        })
    }
}

impl DocumentEngine for PdfiumEngine {
    fn page_count(&self) -> usize {
        self.page_sizes.len()
    }

    fn page_size(&self, page: usize) -> Option<PageSize> {
        self.page_sizes.get(page).copied()
    }

    fn character_count(&self, page: usize) -> usize {
        self.page_text(page).map(|text| text.len()).unwrap_or(0)
    }

    fn character_index_at(&self, point: DocumentPoint, tolerance: Tolerance) -> Option<usize> {
        self.page_text(point.page)?
            .char_index_at(point.x, point.y, tolerance)
    }

    fn word_at(&self, point: DocumentPoint, tolerance: Tolerance) -> Option<WordSpan> {
        self.page_text(point.page)?
            .word_at(point.x, point.y, tolerance)
    }

    fn text(&self, span: TextSpan) -> String {
        self.page_text(span.page)
            .map(|text| text.text(span.offset, span.length))
            .unwrap_or_default()
    }

    fn text_rects(&self, span: TextSpan) -> Vec<DocumentRect> {
        self.page_text(span.page)
            .map(|text| text.rects(span.offset, span.length))
            .unwrap_or_default()
    }

    fn point_to_document(&self, page: usize, point: PagePoint) -> Option<(f32, f32)> {
        let size = self.page_size(page)?;
        Some((point.x, size.height - point.y))
    }

    fn point_from_document(&self, page: usize, x: f32, y: f32) -> Option<PagePoint> {
        let size = self.page_size(page)?;
        Some(PagePoint::new(x, size.height - y))
    }

    /// Link bounds live in document space, so the viewport size does not
    /// change the result.
    fn links(&self, page: usize, _viewport: PixelSize) -> Vec<Link> {
        match self.page_links(page) {
            Ok(links) => links,
            Err(err) => {
                warn!(?err, page, "failed to read page links");
                Vec::new()
            }
        }
    }
}

fn load_page<'a>(document: &PdfDocument<'a>, page_index: usize) -> Result<PdfPage<'a>> {
    let index: PdfPageIndex = page_index
        .try_into()
        .map_err(|_| anyhow!("page {} is out of supported range", page_index))?;
    document
        .pages()
        .get(index)
        .with_context(|| format!("page {} out of range", page_index))
}

#[instrument(skip(document))]
fn extract_page_text(document: &PdfDocument<'static>, page_index: usize) -> Result<PageText> {
    let page = load_page(document, page_index)?;
    let text = page
        .text()
        .with_context(|| format!("failed to extract text for page {}", page_index))?;
    let chars = text
        .chars()
        .iter()
        .map(|ch| TextChar {
            ch: ch.unicode_char().unwrap_or(char::REPLACEMENT_CHARACTER),
            bounds: ch.tight_bounds().ok().map(|rect| document_rect(&rect)),
        })
        .collect();
    Ok(PageText::new(chars))
}

fn document_rect(rect: &PdfRect) -> DocumentRect {
    DocumentRect::new(
        rect.left().value,
        rect.top().value,
        rect.right().value,
        rect.bottom().value,
    )
}

fn link_from_pdfium(link: &PdfLink<'_>, bounds: DocumentRect) -> Option<Link> {
    if let Some(action) = link.action() {
        match action.action_type() {
            PdfActionType::GoToDestinationInSameDocument => {
                if let Some(local) = action.as_local_destination_action() {
                    if let Ok(destination) = local.destination() {
                        if let Ok(page_index) = destination.page_index() {
                            return Some(Link::to_page(bounds, page_index as usize));
                        }
                    }
                }
            }
            PdfActionType::Uri => {
                if let Some(uri_action) = action.as_uri_action() {
                    if let Ok(uri) = uri_action.uri() {
                        if !uri.is_empty() {
                            return Some(Link::to_uri(bounds, uri));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(destination) = link.destination() {
        if let Ok(page_index) = destination.page_index() {
            return Some(Link::to_page(bounds, page_index as usize));
        }
    }

    None
}

fn read_page_sizes(pdfium: &Pdfium, path: &Path) -> Result<Vec<PageSize>> {
    let document = pdfium
        .load_pdf_from_file(path, None)
        .with_context(|| format!("failed to open {:?}", path))?;
    let page_sizes = document
        .pages()
        .iter()
        .map(|page| PageSize::new(page.width().value, page.height().value))
        .collect::<Vec<_>>();
    let expected = usize::try_from(document.pages().len()).unwrap_or_default();
    if page_sizes.len() != expected {
        warn!(
            expected,
            found = page_sizes.len(),
            path = %path.display(),
            "page count mismatch"
        );
    }
    Ok(page_sizes)
}

fn bind_pdfium_from_env() -> Option<Pdfium> {
    match std::env::var(PDFIUM_LIBRARY_ENV) {
        Ok(path) if !path.is_empty() => match Pdfium::bind_to_library(&path) {
            Ok(bindings) => Some(Pdfium::new(bindings)),
            Err(err) => {
                warn!("failed to load Pdfium from {}={}: {}", PDFIUM_LIBRARY_ENV, path, err);
                None
            }
        },
        _ => None,
    }
}

fn bind_pdfium_default() -> Result<Pdfium> {
    let mut errors = Vec::new();

    let cwd_path = Pdfium::pdfium_platform_library_name_at_path("./");

    match Pdfium::bind_to_library(&cwd_path) {
        Ok(bindings) => return Ok(Pdfium::new(bindings)),
        Err(err) => {
            errors.push(format!("{}: {}", cwd_path.display(), err));
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => Ok(Pdfium::new(bindings)),
        Err(err) => {
            errors.push(format!("system: {err}"));
            Err(anyhow!(
                "failed to bind to a pdfium library; set {} or install it ({})",
                PDFIUM_LIBRARY_ENV,
                errors.join(", ")
            ))
        }
    }
}
