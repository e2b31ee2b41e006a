//! Tests for the XML reader and writer working together

use rstest::rstest;

use pomsort::domain::NodeKind;
use pomsort::infrastructure::xml::{
    parse_bytes, parse_str, render, AttributeWrap, WriterOptions, XmlError, DEFAULT_DECLARATION,
};
use pomsort::util::testing::init_test_setup;

const MAVEN_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- parent module -->
<project xmlns="http://maven.apache.org/POM/4.0.0" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd">
  <modelVersion>4.0.0</modelVersion>
  <artifactId>parent</artifactId>
  <description>Tools &amp; libraries</description>
  <properties>
    <argLine><![CDATA[-Xmx1g -Dfile.encoding=UTF-8]]></argLine>
  </properties>
  <modules>
    <module>core</module>
  </modules>
</project>
"#;

const MAVEN_POM_RENDERED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- parent module -->
<project xmlns="http://maven.apache.org/POM/4.0.0"
        xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
        xsi:schemaLocation="http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd">
    <modelVersion>4.0.0</modelVersion>
    <artifactId>parent</artifactId>
    <description>Tools &amp; libraries</description>
    <properties>
        <argLine><![CDATA[-Xmx1g -Dfile.encoding=UTF-8]]></argLine>
    </properties>
    <modules>
        <module>core</module>
    </modules>
</project>
"#;

#[test]
fn given_maven_pom_when_rendering_then_reindents_and_wraps_project() {
    init_test_setup();
    let doc = parse_str(MAVEN_POM).unwrap();

    let out = render(&doc, &WriterOptions::default()).unwrap();

    assert_eq!(out, MAVEN_POM_RENDERED);
}

#[test]
fn given_rendered_pom_when_rendering_again_then_bytes_are_stable() {
    let doc = parse_str(MAVEN_POM_RENDERED).unwrap();

    let out = render(&doc, &WriterOptions::default()).unwrap();

    assert_eq!(out, MAVEN_POM_RENDERED);
}

#[test]
fn given_doctype_and_instruction_when_rendering_then_both_survive() {
    let input = "<?xml version=\"1.0\"?>\n<!DOCTYPE project>\n<?xml-stylesheet href=\"pom.xsl\"?>\n<project><a>1</a></project>";
    let doc = parse_str(input).unwrap();

    let out = render(
        &doc,
        &WriterOptions {
            indent: 2,
            wrap: None,
        },
    )
    .unwrap();

    assert_eq!(
        out,
        "<?xml version=\"1.0\"?>\n<!DOCTYPE project>\n<?xml-stylesheet href=\"pom.xsl\"?>\n<project>\n  <a>1</a>\n</project>\n"
    );
}

#[test]
fn given_no_declaration_when_rendering_then_default_is_first_line() {
    let doc = parse_str("<project/>").unwrap();

    let out = render(&doc, &WriterOptions::default()).unwrap();

    assert_eq!(out, format!("{}\n<project/>\n", DEFAULT_DECLARATION));
}

#[rstest]
#[case(2, false)]
#[case(3, true)]
fn given_attribute_count_when_wrapping_then_threshold_decides(
    #[case] attributes: usize,
    #[case] wrapped: bool,
) {
    let attrs: String = (0..attributes).map(|i| format!(" a{}=\"{}\"", i, i)).collect();
    let doc = parse_str(&format!("<project{}/>", attrs)).unwrap();

    let out = render(&doc, &WriterOptions::default()).unwrap();

    assert_eq!(out.contains("\n        a1="), wrapped, "{}", out);
}

#[test]
fn given_custom_wrap_element_when_rendering_then_only_that_tag_is_wrapped() {
    let doc = parse_str(r#"<project a="1" b="2"><settings x="1" y="2"/></project>"#).unwrap();
    let options = WriterOptions {
        indent: 4,
        wrap: Some(AttributeWrap {
            element: "settings".into(),
            threshold: 1,
            indent: 2,
        }),
    };

    let out = render(&doc, &options).unwrap();

    assert!(out.contains(r#"<project a="1" b="2">"#), "{}", out);
    assert!(out.contains("<settings x=\"1\"\n  y=\"2\"/>"), "{}", out);
}

#[test]
fn given_comments_inside_sections_when_parsing_then_kept_as_nodes() {
    let doc = parse_str("<project><!-- a --><x/><!--b--></project>").unwrap();
    let root = doc.root_element().unwrap();

    let comments: Vec<&str> = doc
        .children(root)
        .iter()
        .filter_map(|&id| match doc.kind(id) {
            Some(NodeKind::Comment(raw)) => Some(raw.as_str()),
            _ => None,
        })
        .collect();

    assert_eq!(comments, vec![" a ", "b"]);
}

#[rstest]
#[case::mismatched("<project><a></b></project>")]
#[case::unclosed("<project><a>")]
#[case::two_roots("<a/><b/>")]
#[case::empty("")]
#[case::stray_text("<a/>text")]
fn given_broken_input_when_parsing_then_malformed(#[case] input: &str) {
    let err = parse_str(input).unwrap_err();

    assert!(matches!(err, XmlError::Malformed { .. }), "{:?}", err);
}

#[test]
fn given_invalid_utf8_when_parsing_bytes_then_reports_offset() {
    let mut input = b"<project>".to_vec();
    input.push(0xff);
    input.extend_from_slice(b"</project>");

    let err = parse_bytes(&input).unwrap_err();

    assert!(
        matches!(err, XmlError::Malformed { position: 9, .. }),
        "{:?}",
        err
    );
}

#[rstest]
#[case::space(" ")]
#[case::newline("\n")]
#[case::tab_padding("\t \t")]
fn given_whitespace_only_value_when_rendering_then_value_survives(#[case] value: &str) {
    // Arrange
    let input = format!(
        "<project><build><plugins><plugin><configuration><delimiter>{}</delimiter>\
         </configuration></plugin></plugins></build></project>",
        value
    );
    let options = WriterOptions::default();

    // Act
    let first = render(&parse_str(&input).unwrap(), &options).unwrap();
    let reparsed = parse_str(&first).unwrap();
    let second = render(&reparsed, &options).unwrap();

    // Assert
    assert!(first.contains(&format!("<delimiter>{}</delimiter>", value)), "{}", first);
    let delimiter = reparsed.locate_first("delimiter").unwrap();
    assert_eq!(reparsed.text_content(delimiter), value);
    assert_eq!(first, second);
}

#[test]
fn given_whitespace_between_elements_when_rendering_then_it_is_reindented() {
    let doc = parse_str("<project>\n\t\t<a>1</a>   <b> </b>\n</project>").unwrap();

    let out = render(
        &doc,
        &WriterOptions {
            indent: 2,
            wrap: None,
        },
    )
    .unwrap();

    assert_eq!(
        out,
        format!("{}\n<project>\n  <a>1</a>\n  <b> </b>\n</project>\n", DEFAULT_DECLARATION)
    );
}
