//! Page-number pagination for the post feeds.
//!
//! Page numbers are 1-based. Anything unparseable reads as page 1 and numbers
//! past the end clamp to the last page, so a page request never fails.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// A requested page, as read from the `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Number(u64),
    Last,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Number(1)
    }
}

impl PageRequest {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("last") => PageRequest::Last,
            Some(value) => match value.parse::<u64>() {
                Ok(number) if number > 0 => PageRequest::Number(number),
                _ => PageRequest::default(),
            },
            None => PageRequest::default(),
        }
    }
}

/// The resolved slice of a collection of `total_items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PageWindow {
    pub fn resolve(request: PageRequest, size: u64, total_items: u64) -> Self {
        let size = size.max(1);
        // An empty collection still has one (empty) page.
        let total_pages = total_items.div_ceil(size).max(1);
        let number = match request {
            PageRequest::Number(n) => n.clamp(1, total_pages),
            PageRequest::Last => total_pages,
        };
        Self {
            number,
            size,
            total_items,
            total_pages,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.size
    }

    pub fn limit(&self) -> u64 {
        self.size
    }
}

/// One page of results plus the numbers a pager needs.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            number: window.number,
            page_size: window.size,
            total_items: window.total_items,
            total_pages: window.total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_first_page() {
        assert_eq!(PageRequest::parse(None), PageRequest::Number(1));
        assert_eq!(PageRequest::parse(Some("abc")), PageRequest::Number(1));
        assert_eq!(PageRequest::parse(Some("0")), PageRequest::Number(1));
        assert_eq!(PageRequest::parse(Some("-4")), PageRequest::Number(1));
        assert_eq!(PageRequest::parse(Some("3")), PageRequest::Number(3));
        assert_eq!(PageRequest::parse(Some("last")), PageRequest::Last);
    }

    #[test]
    fn test_window_for_twenty_five_items() {
        let first = PageWindow::resolve(PageRequest::Number(1), 10, 25);
        assert_eq!((first.offset(), first.limit(), first.total_pages), (0, 10, 3));

        let third = PageWindow::resolve(PageRequest::Number(3), 10, 25);
        assert_eq!(third.offset(), 20);

        let beyond = PageWindow::resolve(PageRequest::Number(99), 10, 25);
        assert_eq!(beyond, third);
        assert_eq!(PageWindow::resolve(PageRequest::Last, 10, 25), third);
    }

    #[test]
    fn test_empty_collection_has_one_page() {
        let window = PageWindow::resolve(PageRequest::Number(5), 10, 0);
        assert_eq!((window.number, window.total_pages, window.offset()), (1, 1, 0));
    }

    #[test]
    fn test_page_navigation_flags() {
        let window = PageWindow::resolve(PageRequest::Number(2), 10, 25);
        let page = Page::new(vec![1, 2, 3], window);
        assert!(page.has_next());
        assert!(page.has_previous());
        assert_eq!(page.map(|n| n * 2).items, vec![2, 4, 6]);
    }
}
