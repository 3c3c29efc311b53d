//! Page layout for the CV viewer. Parsing and drawing the PDF is left to an
//! external renderer; this only decides which pages to ask for and how wide.

pub const MAX_PAGE_WIDTH: u32 = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based, as renderers number pages.
    pub page_number: u32,
    pub width: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CvPager {
    document: String,
    num_pages: Option<u32>,
    container_width: Option<u32>,
}

impl CvPager {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            ..Default::default()
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    /// Called once the renderer has parsed the document.
    pub fn on_document_loaded(&mut self, num_pages: u32) {
        log::debug!("{} loaded with {num_pages} pages", self.document);
        self.num_pages = Some(num_pages);
    }

    pub fn on_resize(&mut self, container_width: u32) {
        self.container_width = Some(container_width);
    }

    pub fn num_pages(&self) -> Option<u32> {
        self.num_pages
    }

    pub fn render_width(&self) -> u32 {
        self.container_width
            .map_or(MAX_PAGE_WIDTH, |w| w.min(MAX_PAGE_WIDTH))
    }

    /// Nothing to render until the page count is known.
    pub fn pages(&self) -> impl Iterator<Item = PageRequest> + '_ {
        let width = self.render_width();
        (1..=self.num_pages.unwrap_or(0)).map(move |page_number| PageRequest { page_number, width })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pages_before_load() {
        let pager = CvPager::new("/cv.pdf");
        assert_eq!(pager.pages().count(), 0);
        assert_eq!(pager.render_width(), MAX_PAGE_WIDTH);
    }

    #[test]
    fn width_follows_container_up_to_cap() {
        let mut pager = CvPager::new("/cv.pdf");
        pager.on_document_loaded(3);

        pager.on_resize(412);
        let pages: Vec<_> = pager.pages().collect();
        assert_eq!(
            pages,
            vec![
                PageRequest { page_number: 1, width: 412 },
                PageRequest { page_number: 2, width: 412 },
                PageRequest { page_number: 3, width: 412 },
            ]
        );

        pager.on_resize(1440);
        assert!(pager.pages().all(|p| p.width == MAX_PAGE_WIDTH));
    }
}
