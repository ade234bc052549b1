#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use reflect_diagnostic::ErrorCode;

use super::*;

#[test]
fn expansion_renders_with_provenance() {
    let expansion = Expansion::new(
        "point.kt",
        "package geo\n@Reflect\ndata class Point(val x: Int)\n",
        &PluginConfig::default(),
    );
    assert!(!expansion.has_errors());
    assert_eq!(
        expansion.rendered(),
        [
            (
                "// reflection for geo.Point".to_owned(),
                "fun Point.getX(): Int = this.x".to_owned()
            ),
            (
                "// reflection for geo.Point".to_owned(),
                "fun Point.product(): List<Pair<String, *>> = listOf(\"x\" to this.x)".to_owned()
            ),
        ]
    );
}

#[test]
fn parse_errors_skip_the_pass() {
    let expansion = Expansion::new(
        "broken.kt",
        "@Reflect\ndata class Point(val x: Int\n",
        &PluginConfig::default(),
    );
    assert!(expansion.output.is_none());
    assert!(expansion.has_errors());
    assert!(expansion.rendered().is_empty());
    assert!(expansion
        .diagnostics()
        .iter()
        .all(|d| d.code.is_parser_error() || d.code.is_lexer_error()));
}

#[test]
fn pass_diagnostics_follow_parse_diagnostics() {
    let expansion = Expansion::new(
        "shape.kt",
        "@Reflect\ninterface Shape\n",
        &PluginConfig::default(),
    );
    let codes: Vec<ErrorCode> = expansion.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, [ErrorCode::E2001]);
}
