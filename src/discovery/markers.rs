//! Generation markers
//!
//! Markers are comment lines of the form `// +genclient` or
//! `// +genclient:nonNamespaced` placed above a type declaration. They are
//! collected into a [`DeclaredType`] record; eligibility is then a plain
//! predicate over that record.

use crate::models::DeclaredType;
use regex::Regex;

/// Verbs an informer needs from the generated client
const INFORMER_VERBS: &[&str] = &["list", "watch"];

/// A recognised `+genclient` marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// `+genclient`
    GenClient,
    /// `+genclient:nonNamespaced`
    NonNamespaced,
    /// `+genclient:noVerbs`
    NoVerbs,
    /// `+genclient:onlyVerbs=list,watch`
    OnlyVerbs(Vec<String>),
    /// `+genclient:skipVerbs=watch`
    SkipVerbs(Vec<String>),
}

impl Marker {
    /// Parse the marker carried by a comment line, if any
    pub fn parse(line: &str) -> Option<Self> {
        let body = line.trim_start().strip_prefix("//")?;
        let body = body.trim_start_matches(['/', '!']).trim();
        let body = body.strip_prefix('+')?;
        let token = body.split_whitespace().next()?;

        match token {
            "genclient" => Some(Marker::GenClient),
            "genclient:nonNamespaced" => Some(Marker::NonNamespaced),
            "genclient:noVerbs" => Some(Marker::NoVerbs),
            _ => {
                if let Some(verbs) = token.strip_prefix("genclient:onlyVerbs=") {
                    Some(Marker::OnlyVerbs(split_verbs(verbs)))
                } else if let Some(verbs) = token.strip_prefix("genclient:skipVerbs=") {
                    Some(Marker::SkipVerbs(split_verbs(verbs)))
                } else {
                    None
                }
            }
        }
    }
}

fn split_verbs(verbs: &str) -> Vec<String> {
    verbs
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Build the structural record for a declaration and its markers
pub fn declared_type(name: &str, markers: &[Marker]) -> DeclaredType {
    let has = |m: &Marker| markers.contains(m);

    let verbs_ok = INFORMER_VERBS.iter().all(|verb| {
        markers.iter().all(|m| match m {
            Marker::OnlyVerbs(only) => only.iter().any(|v| v == verb),
            Marker::SkipVerbs(skip) => !skip.iter().any(|v| v == verb),
            _ => true,
        })
    });

    DeclaredType {
        name: name.to_string(),
        namespaced: !has(&Marker::NonNamespaced),
        eligible: has(&Marker::GenClient) && !has(&Marker::NoVerbs) && verbs_ok,
    }
}

/// Whether a declared type gets generated accessors
pub fn is_eligible(ty: &DeclaredType) -> bool {
    ty.eligible
}

/// Scans Rust source text for marked type declarations
pub struct MarkerScanner {
    declaration: Regex,
}

impl MarkerScanner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            declaration: Regex::new(r"^\s*pub\s+(?:struct|enum)\s+([A-Za-z_][A-Za-z0-9_]*)")?,
        })
    }

    /// Every public struct/enum in `source`, in declaration order
    ///
    /// Markers attach to the next declaration. Blank lines, attributes and
    /// comments in between keep them attached; any other line drops them.
    /// An attribute wrapped over several lines counts as one attribute.
    pub fn scan(&self, source: &str) -> Vec<DeclaredType> {
        let mut types = Vec::new();
        let mut pending: Vec<Marker> = Vec::new();
        let mut attribute_depth = 0;

        for line in source.lines() {
            let trimmed = line.trim();

            if attribute_depth > 0 {
                attribute_depth = open_brackets(attribute_depth, trimmed);
                continue;
            }

            if trimmed.starts_with("//") {
                if let Some(marker) = Marker::parse(trimmed) {
                    pending.push(marker);
                }
                continue;
            }

            if trimmed.is_empty() {
                continue;
            }

            if trimmed.starts_with("#[") {
                attribute_depth = open_brackets(0, trimmed);
                continue;
            }

            if let Some(caps) = self.declaration.captures(line) {
                types.push(declared_type(&caps[1], &pending));
            }
            pending.clear();
        }

        types
    }
}

/// Square brackets still open after `line`, starting from `depth`
///
/// Brackets inside string and char literals and after a `//` comment are
/// ignored.
fn open_brackets(mut depth: usize, line: &str) -> usize {
    let mut chars = line.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(_), '\\') => {
                chars.next();
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') => quote = Some('"'),
            (None, '\'') => {
                // Lifetimes are not char literals
                let mut ahead = chars.clone();
                let is_char = match ahead.next() {
                    Some('\\') => true,
                    Some(_) => ahead.next() == Some('\''),
                    None => false,
                };
                if is_char {
                    quote = Some('\'');
                }
            }
            (None, '/') if chars.peek() == Some(&'/') => break,
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, _) => {}
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markers() {
        assert_eq!(Marker::parse("// +genclient"), Some(Marker::GenClient));
        assert_eq!(
            Marker::parse("/// +genclient:nonNamespaced"),
            Some(Marker::NonNamespaced)
        );
        assert_eq!(
            Marker::parse("// +genclient:onlyVerbs=get,list"),
            Some(Marker::OnlyVerbs(vec!["get".into(), "list".into()]))
        );
        assert_eq!(Marker::parse("// +k8s:deepcopy-gen=true"), None);
        assert_eq!(Marker::parse("// genclient"), None);
    }

    #[test]
    fn test_eligibility_rules() {
        assert!(declared_type("A", &[Marker::GenClient]).eligible);
        assert!(!declared_type("A", &[]).eligible);
        assert!(!declared_type("A", &[Marker::GenClient, Marker::NoVerbs]).eligible);
        assert!(
            !declared_type(
                "A",
                &[Marker::GenClient, Marker::OnlyVerbs(vec!["get".into()])]
            )
            .eligible
        );
        assert!(
            !declared_type(
                "A",
                &[Marker::GenClient, Marker::SkipVerbs(vec!["watch".into()])]
            )
            .eligible
        );
        assert!(
            declared_type(
                "A",
                &[
                    Marker::GenClient,
                    Marker::OnlyVerbs(vec!["get".into(), "list".into(), "watch".into()])
                ]
            )
            .eligible
        );
    }

    #[test]
    fn test_scan_attaches_markers_to_next_declaration() {
        let source = r#"
use serde::Serialize;

// +genclient
// +k8s:deepcopy-gen:interfaces=runtime.Object

/// TestType is a top-level type.
#[derive(Debug, Serialize)]
pub struct TestType {
    pub spec: TestTypeSpec,
}

pub struct TestTypeSpec {}

// +genclient
// +genclient:nonNamespaced
pub struct ClusterTestType {}
"#;
        let types = MarkerScanner::new().unwrap().scan(source);
        assert_eq!(types.len(), 3);

        assert_eq!(types[0].name, "TestType");
        assert!(types[0].eligible && types[0].namespaced);

        assert_eq!(types[1].name, "TestTypeSpec");
        assert!(!types[1].eligible);

        assert_eq!(types[2].name, "ClusterTestType");
        assert!(types[2].eligible && !types[2].namespaced);
    }

    #[test]
    fn test_wrapped_attributes_keep_markers_attached() {
        let source = r#"
// +genclient
#[derive(
    Clone, Debug, Deserialize, Serialize, JsonSchema,
)]
pub struct TestType {}

// +genclient
// +genclient:nonNamespaced
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize)]
#[kube(
    group = "example.io",
    version = "v1",
    kind = "ClusterTestType",
    printcolumn = "{\"jsonPath\":\".spec.items[0]\"}"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTestType {}
"#;
        let types = MarkerScanner::new().unwrap().scan(source);
        assert_eq!(types.len(), 2);
        assert!(types[0].eligible && types[0].namespaced);
        assert!(types[1].eligible && !types[1].namespaced);
    }

    #[test]
    fn test_open_brackets_ignores_literals() {
        assert_eq!(open_brackets(0, "#[derive("), 1);
        assert_eq!(open_brackets(0, "#[derive(Debug)]"), 0);
        assert_eq!(open_brackets(1, r#"doc = "a [ b","#), 1);
        assert_eq!(open_brackets(1, "sep = '[',"), 1);
        assert_eq!(open_brackets(1, ")] // trailing ["), 0);
        assert_eq!(open_brackets(1, r#"x = "\"[","#), 1);
    }

    #[test]
    fn test_code_line_detaches_markers() {
        let source = "// +genclient\nconst X: u8 = 1;\npub struct Orphan {}\n";
        let types = MarkerScanner::new().unwrap().scan(source);
        assert_eq!(types.len(), 1);
        assert!(!types[0].eligible);
    }
}
