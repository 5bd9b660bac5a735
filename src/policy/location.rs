//! Location path classification.
//!
//! Location paths point back into the source schema, e.g.
//! `scenes.scene_1.views.view_4.columns[2]` or
//! `views.view_4.rules.display[0].criteria[1]`.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Segments that list fields generically rather than use them in a rule.
static FIELD_LIST_SEGMENT: OnceLock<Regex> = OnceLock::new();
static RULES_SEGMENT: OnceLock<Regex> = OnceLock::new();

fn segment_regex(cell: &'static OnceLock<Regex>, names: &str) -> &'static Regex {
    cell.get_or_init(|| {
        let pattern = format!(r"(?:^|[./\]])(?:{names})(?:$|[./\[])");
        Regex::new(&pattern).unwrap_or_else(|e| panic!("invalid segment pattern {pattern}: {e}"))
    })
}

/// True when a location path is a generic field-list reference.
///
/// A path qualifies when it has a `columns`, `fields`, or `field_list`
/// segment and no `rules` segment. Table columns and form inputs qualify;
/// anything under a rule does not.
pub fn is_generic_field_list(location_path: &str) -> bool {
    segment_regex(&FIELD_LIST_SEGMENT, "columns|fields|field_list").is_match(location_path)
        && !segment_regex(&RULES_SEGMENT, "rules").is_match(location_path)
}
