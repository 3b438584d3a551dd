//! End-to-end locate runs against real PDFs parsed by the lopdf backend

#[path = "common/fixtures.rs"]
mod fixtures;

use fixtures::{build_pdf, text_lines, utf16_hex, FixturePage};
use pretty_assertions::assert_eq;
use shared_types::{LocatorResult, SearchItem, Severity};
use text_locator::{DocumentSource, Locator, LocatorConfig, LopdfBackend};

// ============================================================================
// Helpers
// ============================================================================

fn locate(pdf: Vec<u8>, items: &[SearchItem]) -> LocatorResult {
    Locator::new(LopdfBackend::new()).locate(&DocumentSource::bytes(pdf), items)
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-6
}

fn ids(result: &LocatorResult) -> Vec<&str> {
    result.highlights.iter().map(|h| h.id.as_str()).collect()
}

// ============================================================================
// Direct tier
// ============================================================================

#[test]
fn test_direct_hit_coordinates() {
    let pdf = build_pdf(&[FixturePage::new(text_lines(72, 720, &["Total: $500"]))], None);
    let result = locate(pdf, &[SearchItem::new("fee", "amount", "$500")]);

    assert_eq!(result.page_count, 1);
    assert!(result.not_found.is_empty());
    let pos = &result.highlights[0].positions[0];
    assert_eq!(pos.page_number, 1);
    // Helvetica without /Widths: 6pt per glyph at 12pt, "$500" starts at glyph 7
    assert!(close(pos.x0, 0.186275), "{pos:?}");
    assert!(close(pos.x1, 0.22549), "{pos:?}");
    assert!(close(pos.y0, 0.078788), "{pos:?}");
    assert!(close(pos.y1, 0.093939), "{pos:?}");
}

#[test]
fn test_hits_across_pages_accumulate() {
    let pdf = build_pdf(
        &[
            FixturePage::new(text_lines(72, 720, &["Deposit: $500"])),
            FixturePage::new(text_lines(72, 720, &["No amounts here"])),
            FixturePage::new(text_lines(72, 400, &["Refund of $500 within 30 days"])),
        ],
        None,
    );
    let result = locate(pdf, &[SearchItem::new("dep", "amount", "$500")]);

    assert_eq!(result.page_count, 3);
    let pages: Vec<u32> = result.highlights[0]
        .positions
        .iter()
        .map(|p| p.page_number)
        .collect();
    assert_eq!(pages, vec![1, 3]);
    assert!(result.highlights[0].positions.iter().all(|p| p.is_within_page()));
}

#[test]
fn test_tj_kerning_gap_reads_as_space() {
    let content = "BT /F1 12 Tf 72 700 Td [(Early) -300 (termination) 15 ( fee)] TJ ET";
    let pdf = build_pdf(&[FixturePage::new(content)], None);
    let result = locate(pdf, &[SearchItem::new("t", "clause", "Early termination fee")]);
    assert_eq!(ids(&result), vec!["t"]);
}

// ============================================================================
// Fallback tier
// ============================================================================

#[test]
fn test_full_width_digits_found_by_fallback() {
    let line = format!(
        "BT /F1 12 Tf 72 700 Td {} Tj ET",
        utf16_hex("電話 ０９０－１２３４－５６７８")
    );
    let pdf = build_pdf(&[FixturePage::new(line)], None);
    let items = vec![SearchItem::new("1", "pii", "090-1234-5678").with_severity(Severity::High)];

    let result = locate(pdf.clone(), &items);
    assert_eq!(ids(&result), vec!["1"]);
    assert_eq!(result.highlights[0].severity, Severity::High);
    assert_eq!(result.highlights[0].positions.len(), 1);

    let direct_only = Locator::with_config(LopdfBackend::new(), LocatorConfig::direct_only())
        .locate(&DocumentSource::bytes(pdf), &items);
    assert!(direct_only.highlights.is_empty());
    assert_eq!(direct_only.not_found, vec!["090-1234-5678".to_string()]);
}

#[test]
fn test_target_split_across_lines_is_not_found() {
    let pdf = build_pdf(
        &[FixturePage::new(text_lines(72, 700, &["Early termi", "nation fee applies"]))],
        None,
    );
    let result = locate(pdf, &[SearchItem::new("split", "clause", "termination")]);
    assert!(result.highlights.is_empty());
    assert_eq!(result.not_found, vec!["termination".to_string()]);
}

// ============================================================================
// Whole requests
// ============================================================================

#[test]
fn test_mixed_items_keep_input_order() {
    let pdf = build_pdf(
        &[FixturePage::new(text_lines(72, 720, &["Alpha clause", "Gamma clause"]))],
        None,
    );
    let items = vec![
        SearchItem::new("a", "x", "Alpha"),
        SearchItem::new("b", "x", "doesnotexist"),
        SearchItem::new("c", "x", "Gamma"),
    ];
    let result = locate(pdf, &items);
    assert_eq!(ids(&result), vec!["a", "c"]);
    assert_eq!(result.not_found, vec!["doesnotexist".to_string()]);
    assert!(result.error.is_none());
}

#[test]
fn test_media_box_inherited_from_pages_node() {
    let pdf = build_pdf(
        &[FixturePage::new(text_lines(72, 800, &["A4 page"]))],
        Some([0, 0, 595, 842]),
    );
    let result = locate(pdf, &[SearchItem::new("a4", "x", "A4")]);
    let pos = &result.highlights[0].positions[0];
    assert!(close(pos.x0, 0.121008), "{pos:?}");
}

#[test]
fn test_zero_area_page_skipped() {
    let pdf = build_pdf(
        &[
            FixturePage::new(text_lines(10, 10, &["secret"])).with_media_box([0, 0, 0, 0]),
            FixturePage::new(text_lines(72, 700, &["secret"])),
        ],
        None,
    );
    let result = locate(pdf, &[SearchItem::new("s", "pii", "secret")]);
    assert_eq!(result.page_count, 2);
    let pages: Vec<u32> = result.highlights[0]
        .positions
        .iter()
        .map(|p| p.page_number)
        .collect();
    assert_eq!(pages, vec![2]);
}

#[test]
fn test_corrupt_bytes_yield_structured_error() {
    let result = locate(
        b"this is not a pdf".to_vec(),
        &[SearchItem::new("1", "pii", "anything")],
    );
    assert!(result.is_error());
    assert!(result.highlights.is_empty());
    assert!(result.not_found.is_empty());
    assert_eq!(result.page_count, 0);
    assert!(result.error.unwrap_or_default().starts_with("PDF open failed"));
}

#[test]
fn test_open_from_path() {
    let pdf = build_pdf(&[FixturePage::new(text_lines(72, 720, &["on disk"]))], None);
    let path = std::env::temp_dir().join(format!("locate-pdf-{}.pdf", std::process::id()));
    std::fs::write(&path, pdf).unwrap();

    let result = Locator::new(LopdfBackend::new())
        .locate(&DocumentSource::path(&path), &[SearchItem::new("d", "x", "disk")]);
    std::fs::remove_file(&path).ok();

    assert_eq!(ids(&result), vec!["d"]);
}

#[test]
fn test_serialized_shape() {
    let pdf = build_pdf(&[FixturePage::new(text_lines(72, 720, &["Total: $500"]))], None);
    let result = locate(
        pdf,
        &[
            SearchItem::new("fee", "amount", "$500").with_reason("late fee"),
            SearchItem::new("gone", "amount", "$900"),
        ],
    );
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["pageCount"], 1);
    assert_eq!(json["notFound"][0], "$900");
    assert_eq!(json["highlights"][0]["type"], "amount");
    assert_eq!(json["highlights"][0]["reason"], "late fee");
    assert!(json["highlights"][0]["suggestedFix"].is_null());
    assert_eq!(json["highlights"][0]["positions"][0]["pageNumber"], 1);
    assert!(json.get("error").is_none());
}
