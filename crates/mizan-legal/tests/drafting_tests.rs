use std::collections::HashMap;

use mizan_core::types::Language;
use mizan_legal::drafting::{draft_document, render};
use mizan_legal::resolve_language;

fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn demand_fields() -> HashMap<String, String> {
    fields(&[
        ("date", "2026-10-19"),
        ("recipient_name", "Omar Trading LLC"),
        ("sender_name", "Layla Hassan"),
        ("amount", "25,000 SAR"),
        ("due_date", "2026-11-01"),
        ("description", "invoice INV-204"),
    ])
}

#[test]
fn renders_english_demand_letter() {
    let doc = draft_document("demand_letter", Language::En, &demand_fields()).unwrap();
    assert_eq!(doc.template, "demand_letter");
    assert_eq!(doc.language, Language::En);
    assert!(doc.content.contains("To: Omar Trading LLC"));
    assert!(doc.content.contains("payment of 25,000 SAR"));
    assert!(!doc.content.contains("{{"));
}

#[test]
fn renders_arabic_demand_letter() {
    let doc = draft_document("demand_letter", Language::Ar, &demand_fields()).unwrap();
    assert!(doc.content.contains("إلى: Omar Trading LLC"));
    assert!(!doc.content.contains("{{"));
}

#[test]
fn reports_missing_fields_in_template_order() {
    let mut partial = demand_fields();
    partial.remove("amount");
    partial.insert("date".into(), "   ".into());
    let err = draft_document("demand_letter", Language::En, &partial).unwrap_err();
    assert_eq!(err.to_string(), "Missing values for: date, amount");
}

#[test]
fn unknown_template_is_an_error() {
    let err = draft_document("will", Language::En, &HashMap::new()).unwrap_err();
    assert!(err.to_string().contains("Unknown document template"));
}

#[test]
fn render_handles_spaced_placeholders_and_extra_fields() {
    let out = render(
        "Hello {{ name }}, welcome to {{city}}.",
        &fields(&[("name", "Sara"), ("city", "Riyadh"), ("unused", "x")]),
    )
    .unwrap();
    assert_eq!(out, "Hello Sara, welcome to Riyadh.");
}

#[test]
fn language_resolution_falls_back_to_default() {
    assert_eq!(resolve_language(Some("ar"), Language::En), Language::Ar);
    assert_eq!(resolve_language(Some("AR"), Language::En), Language::Ar);
    assert_eq!(resolve_language(Some("fr"), Language::Ar), Language::Ar);
    assert_eq!(resolve_language(None, Language::En), Language::En);
}
