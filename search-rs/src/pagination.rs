//! Page windows and URL search-parameter round-tripping
//!
//! The current page lives in the navigable URL so that reload, history
//! navigation and link sharing preserve it. Everything else about a page
//! window is derived: `offset = page_size * (page - 1)`.

use std::fmt::Write as _;

/// Videos shown per result page.
pub const TOTAL_VIDEOS_PER_PAGE: u64 = 12;

/// URL query parameter keys. Fixed constants; changing one breaks every
/// bookmarked search.
pub const SEARCH_RESULT_PAGE_KEY: &str = "searchResultPage";
pub const ACTION_KEY: &str = "action";
pub const MAIN_OBJECT_KEY: &str = "mainObject";
pub const TARGET_OBJECT_KEY: &str = "targetObject";

/// A limit/offset window over an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u64,
    page_size: u64,
}

impl PageWindow {
    /// Window for a requested page. Pages are 1-based; a requested page of
    /// zero is treated as page 1.
    pub fn new(page: u64, page_size: u64) -> Self {
        assert!(page_size > 0, "page size must be positive");
        Self {
            page: page.max(1),
            page_size,
        }
    }

    /// First page with the given page size.
    pub fn first(page_size: u64) -> Self {
        Self::new(1, page_size)
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        self.page_size * (self.page - 1)
    }

    /// Number of pages needed for `total` results.
    pub fn page_count(total: u64, page_size: u64) -> u64 {
        assert!(page_size > 0, "page size must be positive");
        total.div_ceil(page_size)
    }

    /// Clamp this window into `[1, page_count]` for a known total. An empty
    /// result set clamps to page 1.
    pub fn clamped(self, total: u64) -> Self {
        let pages = Self::page_count(total, self.page_size).max(1);
        Self {
            page: self.page.min(pages),
            page_size: self.page_size,
        }
    }
}

/// The shareable search state: current page plus the free-text filters
/// that are externalized into the URL query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    page: u64,
    action: String,
    main_object: String,
    target_object: String,
}

impl SearchParams {
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Default::default()
        }
    }

    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn main_object(&self) -> &str {
        &self.main_object
    }

    pub fn target_object(&self) -> &str {
        &self.target_object
    }

    pub fn set_page(&mut self, page: u64) {
        self.page = page.max(1);
    }

    /// Any filter change invalidates the current result window, so the
    /// page snaps back to 1.
    pub fn set_action(&mut self, action: impl Into<String>) {
        self.action = action.into();
        self.page = 1;
    }

    pub fn set_main_object(&mut self, main_object: impl Into<String>) {
        self.main_object = main_object.into();
        self.page = 1;
    }

    pub fn set_target_object(&mut self, target_object: impl Into<String>) {
        self.target_object = target_object.into();
        self.page = 1;
    }

    /// Window for the current page.
    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page(), TOTAL_VIDEOS_PER_PAGE)
    }

    /// Encode as a URL query string (no leading `?`). Empty filters are
    /// omitted; the page is always present.
    pub fn to_query_string(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{}={}", SEARCH_RESULT_PAGE_KEY, self.page());
        for (key, value) in [
            (ACTION_KEY, &self.action),
            (MAIN_OBJECT_KEY, &self.main_object),
            (TARGET_OBJECT_KEY, &self.target_object),
        ] {
            if !value.is_empty() {
                let _ = write!(out, "&{}={}", key, encode_component(value));
            }
        }
        out
    }

    /// Decode from a URL query string. Unknown keys are ignored; an absent
    /// or unparseable page defaults to 1.
    pub fn from_query_string(query: &str) -> Self {
        let mut params = Self::new();
        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = match pair.split_once('=') {
                Some((k, v)) => (k, decode_component(v)),
                None => (pair, String::new()),
            };
            match key {
                SEARCH_RESULT_PAGE_KEY => {
                    params.page = value.parse::<u64>().ok().filter(|p| *p >= 1).unwrap_or(1);
                }
                ACTION_KEY => params.action = value,
                MAIN_OBJECT_KEY => params.main_object = value,
                TARGET_OBJECT_KEY => params.target_object = value,
                _ => {}
            }
        }
        params
    }
}

/// Percent-encode a query-string component.
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
    out
}

/// Decode a percent-encoded component; `+` decodes to a space. Malformed
/// escapes pass through untouched.
fn decode_component(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                let hex = &value[i + 1..i + 3];
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
