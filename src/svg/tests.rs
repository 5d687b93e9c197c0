use rayon::prelude::*;

use super::{TransformRequest, select_elements, transform_matching};

const SHAPES: &str = concat!(
    r#"<svg xmlns="http://www.w3.org/2000/svg">"#,
    r#"<g class="layer"><rect fill="red"/><circle id="c" r="4"/></g>"#,
    r#"<rect fill="blue" class="x y"/>"#,
    r#"<path d="M0 0L1 1"/>"#,
    r#"</svg>"#,
);

fn translate(x: f64, y: f64) -> TransformRequest {
    TransformRequest::new().translate(x, y)
}

#[test]
fn test_circle_gets_id_and_transform() {
    let outcome = transform_matching(r#"<svg><circle r="5"/></svg>"#, "circle", &translate(10.0, 5.0));

    assert!(outcome.success);
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.matched_elements, 1);
    assert_eq!(
        outcome.modified_document,
        r#"<svg><circle r="5" id="_selected_0" transform="translate(10 5)"/></svg>"#
    );
    assert_eq!(outcome.original_document, r#"<svg><circle r="5"/></svg>"#);
    assert_eq!(outcome.elements[0].id, "_selected_0");
    assert_eq!(outcome.elements[0].tag, "circle");
}

#[test]
fn test_no_match_leaves_document_untouched() {
    let text = r#"<svg><circle r="5"/></svg>"#;
    let outcome = transform_matching(text, ".missing", &translate(10.0, 5.0));

    assert!(!outcome.success);
    assert_eq!(
        outcome.error.as_deref(),
        Some("No elements found matching selector: '.missing'")
    );
    assert_eq!(outcome.modified_document, text);
    assert_eq!(outcome.matched_elements, 0);
    assert!(outcome.elements.is_empty());
}

#[test]
fn test_missing_id_is_byte_identical() {
    for text in [SHAPES, "<?xml version=\"1.0\"?>\n<svg>\n  <rect  x='1'/>\n</svg>\n"] {
        let outcome = transform_matching(text, "#missing-id", &translate(1.0, 1.0));
        assert!(!outcome.success);
        assert_eq!(outcome.modified_document, text);
    }
}

#[test]
fn test_untouched_elements_keep_quotes_and_bom() {
    let text = "\u{feff}<svg><rect x='1' y=\"2\"/><text id=\"t\" font-family='serif'>hi</text></svg>";
    let outcome = transform_matching(text, "text", &translate(1.0, 1.0));
    assert!(outcome.success);
    assert_eq!(
        outcome.modified_document,
        "\u{feff}<svg><rect x='1' y=\"2\"/><text id=\"t\" font-family='serif' transform=\"translate(1 1)\">hi</text></svg>"
    );
}

#[test]
fn test_attribute_selector_only_touches_match() {
    let outcome = transform_matching(
        r#"<svg><rect fill="red"/><rect fill="blue"/></svg>"#,
        r#"rect[fill="blue"]"#,
        &translate(1.0, 1.0),
    );

    assert!(outcome.success);
    assert_eq!(outcome.matched_elements, 1);
    assert_eq!(
        outcome.modified_document,
        r#"<svg><rect fill="red"/><rect fill="blue" id="_selected_0" transform="translate(1 1)"/></svg>"#
    );
}

#[test]
fn test_parse_failure_is_reported() {
    let text = "<svg><rect></svg>";
    let outcome = transform_matching(text, "rect", &translate(1.0, 1.0));

    assert!(!outcome.success);
    let error = outcome.error.unwrap();
    assert!(error.starts_with("Failed to parse document: "), "{error}");
    assert_eq!(outcome.modified_document, text);
}

#[test]
fn test_match_count_equals_elements_with_ids() {
    for selector in ["", "rect", ".layer", ".x.y", "[fill]", "circle#c", "g rect"] {
        let expected = {
            let (_, matches) = select_elements(SHAPES, selector);
            matches.len()
        };
        let outcome = transform_matching(SHAPES, selector, &TransformRequest::new().rotate(5.0));
        if expected == 0 {
            assert!(!outcome.success, "{selector}");
            continue;
        }
        assert!(outcome.success, "{selector}");
        assert_eq!(outcome.matched_elements, expected, "{selector}");
        assert_eq!(outcome.elements.len(), expected, "{selector}");
        assert!(outcome.elements.iter().all(|e| !e.id.is_empty()), "{selector}");
    }
}

#[test]
fn test_synthetic_ids_are_stable() {
    for selector in ["", "rect", "[fill]"] {
        let (first_text, first) = select_elements(SHAPES, selector);
        let (_, second) = select_elements(&first_text, selector);
        let first: Vec<_> = first.iter().map(|m| m.id.clone()).collect();
        let second: Vec<_> = second.iter().map(|m| m.id.clone()).collect();
        assert_eq!(first, second, "{selector}");
    }
}

#[test]
fn test_token_order_ignores_request_field_order() {
    let orders = [
        r#"{"translate":{"x":1,"y":2},"rotate":{"angle":3},"scale":{"x":4},"skew":{"x":5},"matrix":[1,0,0,1,0,0]}"#,
        r#"{"matrix":[1,0,0,1,0,0],"skew":{"x":5},"scale":{"x":4},"rotate":{"angle":3},"translate":{"x":1,"y":2}}"#,
        r#"{"scale":{"x":4},"matrix":[1,0,0,1,0,0],"translate":{"x":1,"y":2},"skew":{"x":5},"rotate":{"angle":3}}"#,
    ];
    for json in orders {
        let request = TransformRequest::from_json(json).unwrap();
        let outcome = transform_matching(r#"<svg><rect/></svg>"#, "rect", &request);
        assert_eq!(
            outcome.modified_document,
            r#"<svg><rect id="_selected_0" transform="translate(1 2) rotate(3) scale(4 4) skewX(5) matrix(1 0 0 1 0 0)"/></svg>"#
        );
    }
}

#[test]
fn test_existing_transform_and_direct_attributes() {
    let request = TransformRequest::from_json(
        r#"{"scale":{"x":2},"fill":"green","onclick":"alert(1)","stroke-width":1.5}"#,
    )
    .unwrap();
    let outcome = transform_matching(
        r#"<svg><rect id="r" transform="rotate(45)" fill="red"/></svg>"#,
        "#r",
        &request,
    );
    assert_eq!(
        outcome.modified_document,
        r#"<svg><rect id="r" transform="rotate(45) scale(2 2)" fill="green" stroke-width="1.5"/></svg>"#
    );
    // Snapshots are taken before the transform.
    assert_eq!(outcome.elements[0].attributes.get("fill"), Some("red"));
}

#[test]
fn test_namespaces_survive_transform() {
    let text = concat!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
        "\n  <use xlink:href=\"#icon\" x=\"0\"/>\n",
        "</svg>",
    );
    let outcome = transform_matching(text, "use", &translate(3.0, 0.0));
    assert_eq!(
        outcome.modified_document,
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
            "\n  <use xlink:href=\"#icon\" x=\"0\" id=\"_selected_0\" transform=\"translate(3 0)\"/>\n",
            "</svg>",
        )
    );
}

#[test]
fn test_duplicate_ids_resolve_to_first_element() {
    let outcome = transform_matching(
        r#"<svg><rect id="a"/><rect id="a"/></svg>"#,
        "rect",
        &translate(1.0, 2.0),
    );
    assert_eq!(outcome.matched_elements, 2);
    assert_eq!(
        outcome.modified_document,
        r#"<svg><rect id="a" transform="translate(1 2) translate(1 2)"/><rect id="a"/></svg>"#
    );
}

#[test]
fn test_empty_request_still_assigns_ids() {
    let outcome = transform_matching(r#"<svg><rect/></svg>"#, "rect", &TransformRequest::new());
    assert!(outcome.success);
    assert_eq!(outcome.modified_document, r#"<svg><rect id="_selected_0"/></svg>"#);
}

#[test]
fn test_outcome_json_shape() {
    let outcome = transform_matching(r#"<svg><circle r="5"/></svg>"#, "circle", &translate(1.0, 1.0));
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["success"], true);
    assert!(json.get("error").is_none());
    assert_eq!(json["matchedElements"], 1);
    assert!(json["originalDocument"].is_string());
    assert!(json["modifiedDocument"].is_string());

    let element = &json["elements"][0];
    assert_eq!(element["id"], "_selected_0");
    assert_eq!(element["tag"], "circle");
    let keys: Vec<_> = element["attributes"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["r", "id"]);

    let failed = transform_matching("<svg/>", "rect", &translate(1.0, 1.0));
    let json = serde_json::to_value(&failed).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("'rect'"));
}

#[test]
fn test_independent_documents_in_parallel() {
    let documents: Vec<String> = (0..32)
        .map(|i| format!(r#"<svg><rect width="{i}"/><circle r="{i}"/></svg>"#))
        .collect();
    let request = translate(1.0, 1.0);

    let outcomes: Vec<_> = documents
        .par_iter()
        .map(|text| transform_matching(text, "circle", &request))
        .collect();

    for (i, outcome) in outcomes.iter().enumerate() {
        assert!(outcome.success);
        assert_eq!(
            outcome.modified_document,
            format!(
                r#"<svg><rect width="{i}"/><circle r="{i}" id="_selected_0" transform="translate(1 1)"/></svg>"#
            )
        );
    }
}
