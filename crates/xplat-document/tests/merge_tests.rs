//! Merge engine behavior against a realistic project document.

use xplat_document::{merge_into, parse_str, to_string, Element};

const PROJECT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<widget xmlns     = "http://www.w3.org/ns/widgets"
        xmlns:cdv = "http://cordova.apache.org/ns/1.0"
        id        = "io.cordova.hellocordova"
        version   = "0.0.1">
    <name>Hello Cordova</name>
    <description>
        A sample Apache Cordova application that responds to the deviceready event.
    </description>
    <author href="http://cordova.io" email="dev@cordova.apache.org">
        Apache Cordova Team
    </author>
    <content src="index.html" />
    <access origin="*" />
    <preference name="fullscreen" value="true" />
    <preference name="webviewbounce" value="true" />
</widget>
"#;

fn dest() -> Element {
    parse_str(PROJECT_XML).unwrap().root
}

fn xml(s: &str) -> Element {
    parse_str(s).unwrap().root
}

// =============================================================================
// Root attributes and text
// =============================================================================

#[test]
fn test_root_merge_without_clobber() {
    let mut dest = dest();
    let source = xml(r#"<widget foo="bar" id="NOTANID">TEXT</widget>"#);

    merge_into(&source, &mut dest, "", false);

    assert_eq!(dest.attr("foo"), Some("bar"));
    assert_eq!(dest.attr("id"), Some("io.cordova.hellocordova"));
    assert_ne!(dest.text, "TEXT");
}

#[test]
fn test_root_merge_with_clobber() {
    let mut dest = dest();
    let source = xml(r#"<widget foo="bar" id="NOTANID">TEXT</widget>"#);

    merge_into(&source, &mut dest, "foo", true);

    assert_eq!(dest.attr("foo"), Some("bar"));
    assert_eq!(dest.attr("id"), Some("NOTANID"));
    assert_eq!(dest.text, "TEXT");
}

#[test]
fn test_empty_source_is_identity() {
    for clobber in [false, true] {
        let mut dest = dest();
        let before = dest.clone();

        merge_into(&Element::new("widget"), &mut dest, "android", clobber);

        assert_eq!(dest, before, "clobber={clobber}");
    }
}

// =============================================================================
// Platform overlays
// =============================================================================

#[test]
fn test_wrong_platform_overlay_has_no_effect() {
    let mut dest = dest();
    let before = to_string(&xplat_document::Document::from_root(dest.clone())).unwrap();
    let source = xml(
        r#"<widget><platform name="bar"><testElement testAttrib="value">testTEXT</testElement></platform></widget>"#,
    );

    merge_into(&source, &mut dest, "foo", true);

    let after = to_string(&xplat_document::Document::from_root(dest)).unwrap();
    assert_eq!(after, before);
}

#[test]
fn test_matching_platform_overlay_merges_children() {
    let mut dest = dest();
    let source = xml(
        r#"<widget><platform name="bar"><testElement testAttrib="value">testTEXT</testElement></platform></widget>"#,
    );

    merge_into(&source, &mut dest, "bar", true);

    let element = dest.find("testElement").expect("overlay child merged at root");
    assert_eq!(element.attr("testAttrib"), Some("value"));
    assert_eq!(element.text, "testTEXT");
    assert!(dest.find("platform").is_none(), "wrapper must not be copied");
}

#[test]
fn test_matching_overlay_equals_top_level_merge() {
    let overlay = xml(
        r#"<widget><platform name="ios">
            <author href="http://x">X</author>
            <preference name="Orientation" value="portrait"/>
            <preference name="fullscreen" value="true"/>
        </platform></widget>"#,
    );
    let flat = xml(
        r#"<widget>
            <author href="http://x">X</author>
            <preference name="Orientation" value="portrait"/>
            <preference name="fullscreen" value="true"/>
        </widget>"#,
    );

    let mut via_overlay = dest();
    let mut via_flat = dest();
    merge_into(&overlay, &mut via_overlay, "ios", true);
    merge_into(&flat, &mut via_flat, "ios", true);

    assert_eq!(via_overlay, via_flat);
}

// =============================================================================
// Singleton elements
// =============================================================================

#[test]
fn test_singleton_merge_without_clobber() {
    let mut dest = dest();
    let source = xml(
        r#"<widget><author testAttrib="value" href="http://www.nowhere.com">SUPER_AUTHOR</author></widget>"#,
    );

    merge_into(&source, &mut dest, "", false);

    let authors: Vec<_> = dest.find_all("author").collect();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].attr("testAttrib"), Some("value"));
    assert_eq!(authors[0].attr("href"), Some("http://cordova.io"));
    assert_eq!(authors[0].attr("email"), Some("dev@cordova.apache.org"));
    assert!(authors[0].text.contains("Apache Cordova Team"));
}

#[test]
fn test_singleton_merge_with_clobber() {
    let mut dest = dest();
    let source = xml(
        r#"<widget><author testAttrib="value" href="http://www.nowhere.com">SUPER_AUTHOR</author></widget>"#,
    );

    merge_into(&source, &mut dest, "", true);

    let authors: Vec<_> = dest.find_all("author").collect();
    assert_eq!(authors.len(), 1);
    assert_eq!(authors[0].attr("testAttrib"), Some("value"));
    assert_eq!(authors[0].attr("href"), Some("http://www.nowhere.com"));
    assert_eq!(authors[0].attr("email"), Some("dev@cordova.apache.org"));
    assert_eq!(authors[0].text, "SUPER_AUTHOR");
}

#[test]
fn test_singleton_never_multiplies_across_runs() {
    let mut dest = dest();
    let source = xml(r#"<widget><author email="a@b">A</author><content src="main.html"/></widget>"#);

    for _ in 0..5 {
        merge_into(&source, &mut dest, "", true);
    }

    assert_eq!(dest.find_all("author").count(), 1);
    assert_eq!(dest.find_all("content").count(), 1);
    assert_eq!(dest.find("content").unwrap().attr("src"), Some("main.html"));
}

#[test]
fn test_missing_singleton_is_appended() {
    let mut dest = xml("<widget/>");
    let source = xml(r#"<widget><content src="index.html"/></widget>"#);

    merge_into(&source, &mut dest, "", false);

    assert_eq!(dest.find("content").and_then(|c| c.attr("src")), Some("index.html"));
}

// =============================================================================
// Repeatable elements
// =============================================================================

#[test]
fn test_repeatable_children_appended() {
    let mut dest = dest();
    let source = xml(r#"<widget><preference num="1"/> <preference num="2"/></widget>"#);

    merge_into(&source, &mut dest, "", true);

    assert_eq!(dest.find_all("preference").count(), 4);
}

#[test]
fn test_exact_duplicate_not_appended() {
    let mut dest = dest();
    let source = xml(r#"<widget><preference name="fullscreen" value="true"/></widget>"#);

    merge_into(&source, &mut dest, "", true);

    assert_eq!(dest.find_all("preference").count(), 2);
}

#[test]
fn test_same_name_different_value_both_survive() {
    let mut dest = dest();
    let source = xml(r#"<widget><preference name="fullscreen" value="false"/></widget>"#);

    merge_into(&source, &mut dest, "", true);

    let values: Vec<_> = dest
        .find_all("preference")
        .filter(|p| p.attr("name") == Some("fullscreen"))
        .filter_map(|p| p.attr("value"))
        .collect();
    assert_eq!(values, vec!["true", "false"]);
}

#[test]
fn test_partial_duplicate_is_not_skipped() {
    let mut dest = dest();
    assert_eq!(dest.remove_all("access"), 1);

    let external = xml(r#"<widget><access origin="*" launch-external="yes"/></widget>"#);
    merge_into(&external, &mut dest, "", true);
    assert_eq!(dest.find_all("access").count(), 1);

    let internal = xml(r#"<widget><access origin="*"/></widget>"#);
    merge_into(&internal, &mut dest, "", true);
    assert_eq!(dest.find_all("access").count(), 2);
}

#[test]
fn test_duplicate_check_ignores_text() {
    let mut dest = xml(r#"<widget><license type="mit">old</license></widget>"#);
    let source = xml(r#"<widget><license type="mit">new</license></widget>"#);

    merge_into(&source, &mut dest, "", true);

    let licenses: Vec<_> = dest.find_all("license").collect();
    assert_eq!(licenses.len(), 1);
    assert_eq!(licenses[0].text, "old");
}

// =============================================================================
// Namespaced elements
// =============================================================================

#[test]
fn test_namespaced_elements() {
    let mut dest = dest();
    let source = xml(r#"<widget><foo:bar testAttrib="value">testText</foo:bar></widget>"#);

    merge_into(&source, &mut dest, "foo", true);

    let element = dest.find("foo:bar").expect("namespaced element merged");
    assert_eq!(element.attr("testAttrib"), Some("value"));
    assert_eq!(element.text, "testText");
}

#[test]
fn test_prefixed_name_not_confused_with_local_name() {
    let mut dest = xml(r#"<widget><author>Plain</author></widget>"#);
    let source = xml(r#"<widget><cdv:author>Prefixed</cdv:author></widget>"#);

    merge_into(&source, &mut dest, "", true);

    assert_eq!(dest.find("author").unwrap().text, "Plain");
    assert_eq!(dest.find("cdv:author").unwrap().text, "Prefixed");
}
