//! One-shot page behaviors run once a page is loaded.

use scraper::{ElementRef, Selector};
use serde::Serialize;

use crate::page::{Page, select_all};

/// Body class written by templates for clients without scripting.
pub const NO_JS_CLASS: &str = "foswikiNoJs";

/// Body class marking script availability.
pub const JS_CLASS: &str = "foswikiJs";

/// Meta tag holding the label of the search result banner.
pub const NUM_TOPICS_LABEL: &str = "TEXT_NUM_TOPICS";

/// Attachment count shown in one attachment table header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentCount {
    /// Number of attachments (table rows minus the header row).
    pub count: usize,
    /// Markup appended to each `.patternAttachmentHeader` of the block.
    pub label: String,
    /// How many headers receive the label.
    pub headers: usize,
}

/// What the ready behaviors computed for a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReadyReport {
    /// Body classes after the script-availability swap.
    pub body_classes: Vec<String>,
    /// One entry per `div.foswikiAttachments` holding a table.
    pub attachments: Vec<AttachmentCount>,
    /// Sum of all search result counts on the page.
    pub search_results: u64,
    /// Banner written into `#foswikiNumberOfResultsContainer`, if any.
    pub results_banner: Option<String>,
    /// Name or id of the input that receives initial focus.
    pub focus: Option<String>,
    /// Whether Enter is suppressed in page inputs (edit pages).
    pub suppress_enter: bool,
    /// Whether a change-form button is present; clicking it disables
    /// edit validation.
    pub change_form_button: bool,
}

/// Run the ready behaviors against `page`.
///
/// Swaps the body's no-script class for the script class and computes the
/// counters, focus target and key handling the page needs.
pub fn on_ready(page: &Page) -> ReadyReport {
    page.swap_body_class(NO_JS_CLASS, JS_CLASS);

    let document = page.document();

    let attachments = select_all(&document, "div.foswikiAttachments")
        .into_iter()
        .filter_map(|block| {
            let table = block
                .select(&Selector::parse("table.foswikiTable").ok()?)
                .next()?;
            let rows = own_rows(table);
            let headers = block
                .select(&Selector::parse(".patternAttachmentHeader").ok()?)
                .count();
            let count = rows.saturating_sub(1);
            Some(AttachmentCount {
                count,
                label: format!(" <span class='foswikiSmall'>{}</span>", count),
                headers,
            })
        })
        .collect();

    let search_results = select_all(&document, ".foswikiSearchResultCount span")
        .into_iter()
        .filter_map(|el| leading_int(&el.text().collect::<String>()))
        .sum::<u64>();

    let has_container = !select_all(&document, "#foswikiNumberOfResultsContainer").is_empty();
    let results_banner = (search_results > 0 && has_container).then(|| {
        format!(
            " {} <b>{} </b>",
            page.meta_tag(NUM_TOPICS_LABEL).unwrap_or_default(),
            search_results
        )
    });

    let focus = select_all(&document, "input.foswikiFocus")
        .first()
        .and_then(|el| el.value().attr("name").or_else(|| el.value().id()))
        .map(str::to_string);

    let change_form_button = !select_all(&document, "input.foswikiChangeFormButton").is_empty();

    ReadyReport {
        body_classes: page.body_classes(),
        attachments,
        search_results,
        results_banner,
        focus,
        suppress_enter: page.has_body_class("patternEditPage"),
        change_form_button,
    }
}

/// Rows belonging to `table` itself, not to tables nested in its cells.
fn own_rows(table: ElementRef<'_>) -> usize {
    table
        .children()
        .filter_map(ElementRef::wrap)
        .map(|child| match child.value().name() {
            "tr" => 1,
            "thead" | "tbody" | "tfoot" => child
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|row| row.value().name() == "tr")
                .count(),
            _ => 0,
        })
        .sum()
}

/// Parse leading digits the way `parseInt` does; `None` when there are none.
fn leading_int(text: &str) -> Option<u64> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"<html><head>
<meta name="TEXT_NUM_TOPICS" content="Number of topics:" />
</head>
<body class="foswikiNoJs patternSearchResultsPage">
  <div class="foswikiSearchResultCount">Found <span>3</span></div>
  <div class="foswikiSearchResultCount">Found <span>4 topics</span></div>
  <div class="foswikiSearchResultCount">Found <span>n/a</span></div>
  <div id="foswikiNumberOfResultsContainer"></div>
  <input type="text" class="foswikiFocus" name="search" />
</body></html>"#;

    const ATTACHMENT_PAGE: &str = r#"<html><body class="foswikiNoJs">
  <div class="foswikiAttachments">
    <div class="patternAttachmentHeader">Attachments</div>
    <table class="foswikiTable">
      <tr><th>Name</th></tr>
      <tr><td>a.png</td></tr>
      <tr><td>b.pdf</td></tr>
    </table>
  </div>
</body></html>"#;

    #[test]
    fn test_body_class_swap() {
        let page = Page::parse("/", ATTACHMENT_PAGE);
        let report = on_ready(&page);
        assert_eq!(report.body_classes, vec!["foswikiJs"]);
        assert!(page.has_body_class(JS_CLASS));
    }

    #[test]
    fn test_attachment_count() {
        let report = on_ready(&Page::parse("/", ATTACHMENT_PAGE));
        assert_eq!(
            report.attachments,
            vec![AttachmentCount {
                count: 2,
                label: " <span class='foswikiSmall'>2</span>".to_string(),
                headers: 1,
            }]
        );
    }

    #[test]
    fn test_attachment_count_ignores_nested_tables() {
        let html = r#"<html><body>
  <div class="foswikiAttachments">
    <table class="foswikiTable">
      <thead><tr><th>Name</th></tr></thead>
      <tbody>
        <tr><td>a.png</td></tr>
        <tr><td><table><tr><td>x</td></tr><tr><td>y</td></tr></table></td></tr>
      </tbody>
    </table>
  </div>
</body></html>"#;
        let report = on_ready(&Page::parse("/", html));
        assert_eq!(report.attachments.len(), 1);
        assert_eq!(report.attachments[0].count, 2);
        assert_eq!(report.attachments[0].headers, 0);
    }

    #[test]
    fn test_search_results_banner() {
        let report = on_ready(&Page::parse("/", SEARCH_PAGE));
        assert_eq!(report.search_results, 7);
        assert_eq!(
            report.results_banner.as_deref(),
            Some(" Number of topics: <b>7 </b>")
        );
        assert_eq!(report.focus.as_deref(), Some("search"));
        assert!(!report.suppress_enter);
    }

    #[test]
    fn test_no_banner_without_results() {
        let report = on_ready(&Page::parse("/", ATTACHMENT_PAGE));
        assert_eq!(report.search_results, 0);
        assert_eq!(report.results_banner, None);
        assert_eq!(report.focus, None);
    }

    #[test]
    fn test_edit_page_flags() {
        let html = r#"<html><body class="patternEditPage">
            <input type="submit" class="foswikiChangeFormButton" />
        </body></html>"#;
        let report = on_ready(&Page::parse("/", html));
        assert!(report.suppress_enter);
        assert!(report.change_form_button);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int(" 12 topics"), Some(12));
        assert_eq!(leading_int("none"), None);
    }
}
