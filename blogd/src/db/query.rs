//! SQL text composition for selections, counts and pagination windows.
//!
//! These helpers only glue strings together. Filter values must always be bound as query
//! parameters by the caller; the only values formatted into SQL here are page windows, which
//! are normalised integers.

/// Default number of rows in a page when the caller asks for `size <= 0`.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page a caller can request. Larger sizes are clamped down.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A normalised pagination window.
///
/// `page` is 1-based. Construct through [`Page::new`], which applies the defaults, so a `Page`
/// always has `page >= 1` and `1 <= size <= MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: i64,
    size: i64,
}

impl Page {
    /// Normalise a raw `(page, size)` request: `page <= 0` becomes 1, `size <= 0` becomes
    /// [`DEFAULT_PAGE_SIZE`] and anything above [`MAX_PAGE_SIZE`] is clamped.
    pub fn new(page: i64, size: i64) -> Self {
        let page = if page <= 0 { 1 } else { page };
        let size = if size <= 0 { DEFAULT_PAGE_SIZE } else { size.min(MAX_PAGE_SIZE) };
        Self { page, size }
    }

    #[inline]
    pub fn page(&self) -> i64 {
        self.page
    }

    #[inline]
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Number of rows skipped before this window starts.
    #[inline]
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Append a pessimistic row lock to `base` when `for_update` is set.
///
/// Postgres requires the locking clause after `LIMIT`/`OFFSET`, so apply this last.
pub fn select_query(base: &str, for_update: bool) -> String {
    if for_update {
        format!("{base} FOR UPDATE")
    } else {
        base.to_string()
    }
}

/// Rewrite `SELECT <columns> FROM ...` into `SELECT COUNT(*) FROM ...` over the same predicate.
///
/// `base` must not carry `ORDER BY`, `LIMIT` or a locking clause; build the count from the
/// filtered selection before those are added. Text that does not start with `SELECT` or has no
/// top-level `FROM` is returned unchanged.
pub fn count_query(base: &str) -> String {
    let trimmed = base.trim_start();
    let Some(head) = trimmed.get(..6) else {
        return base.to_string();
    };
    if !head.eq_ignore_ascii_case("select") {
        return base.to_string();
    }

    match find_keyword(trimmed, "from") {
        Some(from) => format!("SELECT COUNT(*) {}", &trimmed[from..]),
        None => base.to_string(),
    }
}

/// Apply the `LIMIT`/`OFFSET` window described by `page`.
pub fn pagination_query(base: &str, page: Page) -> String {
    format!("{base} LIMIT {} OFFSET {}", page.size(), page.offset())
}

/// Byte offset of the first whole-word, case-insensitive `keyword` outside parentheses.
fn find_keyword(sql: &str, keyword: &str) -> Option<usize> {
    let bytes = sql.as_bytes();
    let len = keyword.len();
    let mut depth = 0usize;

    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => {
                let Some(candidate) = sql.get(i..i + len) else {
                    continue;
                };
                let boundary_before = i == 0 || !is_word_byte(bytes[i - 1]);
                let boundary_after = bytes.get(i + len).is_none_or(|b| !is_word_byte(*b));
                if boundary_before && boundary_after && candidate.eq_ignore_ascii_case(keyword) {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_query_lock_clause() {
        let base = "SELECT * FROM posts WHERE id = $1";
        assert_eq!(select_query(base, false), base);
        assert_eq!(select_query(base, true), "SELECT * FROM posts WHERE id = $1 FOR UPDATE");
    }

    #[test]
    fn test_count_query_keeps_predicate() {
        assert_eq!(
            count_query("SELECT id, title FROM posts WHERE author_id = $1"),
            "SELECT COUNT(*) FROM posts WHERE author_id = $1"
        );
        assert_eq!(count_query("SELECT * FROM posts"), "SELECT COUNT(*) FROM posts");
    }

    #[test]
    fn test_count_query_ignores_nested_from() {
        let base = "SELECT id, (SELECT name FROM users u WHERE u.id = p.author_id) AS author FROM posts p";
        assert_eq!(count_query(base), "SELECT COUNT(*) FROM posts p");
    }

    #[test]
    fn test_count_query_does_not_match_column_names() {
        // `from_address` is a column, not the keyword
        assert_eq!(
            count_query("select from_address, id from mails where id > 1"),
            "SELECT COUNT(*) from mails where id > 1"
        );
    }

    #[test]
    fn test_count_query_leaves_non_select_untouched() {
        assert_eq!(count_query("DELETE FROM posts"), "DELETE FROM posts");
        assert_eq!(count_query("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_page_defaults_and_normalisation() {
        assert_eq!(Page::new(0, 0), Page::new(1, DEFAULT_PAGE_SIZE));
        assert_eq!(Page::new(-3, -1), Page::new(1, 10));
        assert_eq!(Page::default().offset(), 0);

        let p = Page::new(3, 20);
        assert_eq!(p.page(), 3);
        assert_eq!(p.size(), 20);
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn test_page_size_clamped() {
        let p = Page::new(2, 10_000);
        assert_eq!(p.size(), MAX_PAGE_SIZE);
        assert_eq!(p.offset(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_pagination_query() {
        assert_eq!(
            pagination_query("SELECT * FROM posts ORDER BY id", Page::new(2, 5)),
            "SELECT * FROM posts ORDER BY id LIMIT 5 OFFSET 5"
        );
        assert_eq!(
            pagination_query("SELECT * FROM posts", Page::new(0, 0)),
            "SELECT * FROM posts LIMIT 10 OFFSET 0"
        );
    }

    #[test]
    fn test_lock_applies_after_window() {
        let sql = select_query(&pagination_query("SELECT * FROM posts ORDER BY id", Page::new(1, 2)), true);
        assert_eq!(sql, "SELECT * FROM posts ORDER BY id LIMIT 2 OFFSET 0 FOR UPDATE");
    }
}
