//! Page-number pagination for post listings.
//!
//! Page lookup is lenient: a missing or non-numeric page number yields the
//! first page, and a number outside `1..=num_pages` yields the last one.
//! Listings therefore never fail because of the `page` parameter.

use serde::{Deserialize, Serialize};

/// `?page=` query parameter, kept raw so that junk can fall back gracefully
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn as_deref(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: i64,
    per_page: i64,
}

/// A resolved page number plus the slice bounds to fetch it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub offset: i64,
    pub limit: i64,
}

impl Paginator {
    /// `per_page` below 1 is treated as 1
    pub fn new(count: i64, per_page: i64) -> Self {
        Self {
            count: count.max(0),
            per_page: per_page.max(1),
        }
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// An empty listing still has one (empty) page
    pub fn num_pages(&self) -> i64 {
        if self.count == 0 {
            1
        } else {
            (self.count + self.per_page - 1) / self.per_page
        }
    }

    pub fn get_page(&self, raw: Option<&str>) -> PageWindow {
        let number = match raw.map(str::trim).and_then(|r| r.parse::<i64>().ok()) {
            None => 1,
            Some(n) if n < 1 || n > self.num_pages() => self.num_pages(),
            Some(n) => n,
        };

        PageWindow {
            number,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<i64>,
    pub previous_page_number: Option<i64>,
    /// 1-based index of the first item on the page, 0 for an empty listing
    pub start_index: i64,
    /// 1-based index of the last item on the page
    pub end_index: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow, paginator: &Paginator) -> Self {
        let number = window.number;
        let num_pages = paginator.num_pages();
        let count = paginator.count();
        let has_next = number < num_pages;
        let has_previous = number > 1;

        let start_index = if count == 0 {
            0
        } else {
            window.offset + 1
        };
        let end_index = if number == num_pages {
            count
        } else {
            number * paginator.per_page()
        };

        Self {
            items,
            number,
            num_pages,
            count,
            per_page: paginator.per_page(),
            has_next,
            has_previous,
            next_page_number: has_next.then_some(number + 1),
            previous_page_number: has_previous.then_some(number - 1),
            start_index,
            end_index,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next: self.has_next,
            has_previous: self.has_previous,
            next_page_number: self.next_page_number,
            previous_page_number: self.previous_page_number,
            start_index: self.start_index,
            end_index: self.end_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(count: i64, raw: Option<&str>) -> Page<i64> {
        let paginator = Paginator::new(count, 10);
        let window = paginator.get_page(raw);
        let items = (window.offset..(window.offset + window.limit).min(count)).collect();
        Page::new(items, window, &paginator)
    }

    #[test]
    fn num_pages_rounds_up_and_never_hits_zero() {
        assert_eq!(Paginator::new(0, 10).num_pages(), 1);
        assert_eq!(Paginator::new(1, 10).num_pages(), 1);
        assert_eq!(Paginator::new(10, 10).num_pages(), 1);
        assert_eq!(Paginator::new(11, 10).num_pages(), 2);
        assert_eq!(Paginator::new(13, 10).num_pages(), 2);
        assert_eq!(Paginator::new(21, 10).num_pages(), 3);
    }

    #[test]
    fn missing_or_junk_page_is_first() {
        let paginator = Paginator::new(25, 10);
        for raw in [None, Some(""), Some("abc"), Some("2.5"), Some("1e3")] {
            assert_eq!(paginator.get_page(raw).number, 1, "raw={raw:?}");
        }
    }

    #[test]
    fn out_of_range_page_is_last() {
        let paginator = Paginator::new(25, 10);
        for raw in ["0", "-4", "4", "999"] {
            let window = paginator.get_page(Some(raw));
            assert_eq!(window.number, 3, "raw={raw}");
            assert_eq!(window.offset, 20);
        }
        assert_eq!(paginator.get_page(Some(" 2 ")).number, 2);
    }

    #[test]
    fn thirteen_posts_split_ten_and_three() {
        let first = page_of(13, None);
        assert_eq!(first.items.len(), 10);
        assert!(first.has_next);
        assert!(!first.has_previous);
        assert_eq!(first.next_page_number, Some(2));
        assert_eq!((first.start_index, first.end_index), (1, 10));

        let second = page_of(13, Some("2"));
        assert_eq!(second.items.len(), 3);
        assert!(!second.has_next);
        assert_eq!(second.previous_page_number, Some(1));
        assert_eq!((second.start_index, second.end_index), (11, 13));
    }

    #[test]
    fn empty_listing_has_one_empty_page() {
        let page = page_of(0, Some("3"));
        assert_eq!(page.number, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.num_pages, 1);
        assert_eq!((page.start_index, page.end_index), (0, 0));
        assert!(!page.has_next && !page.has_previous);
    }

    #[test]
    fn map_keeps_page_metadata() {
        let page = page_of(13, Some("2")).map(|n| n.to_string());
        assert_eq!(page.items, vec!["10", "11", "12"]);
        assert_eq!(page.number, 2);
        assert_eq!(page.count, 13);
    }
}
