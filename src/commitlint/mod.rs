//! Commit message linting for the `commit-msg` hook.
//!
//! Messages follow the `type(scope): subject` convention. Automated commits
//! (merges, reverts, fixup/squash) are exempt from all rules.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Commit types accepted by the `type-enum` rule.
pub const ALLOWED_TYPES: [&str; 7] = ["feat", "fix", "docs", "style", "refactor", "test", "chore"];

/// Maximum subject length enforced by `subject-max-length`.
pub const MAX_SUBJECT_LENGTH: usize = 72;

/// Prefixes of auto-generated commits that bypass linting.
const EXEMPT_PREFIXES: [&str; 4] = ["Merge ", "Revert ", "fixup! ", "squash! "];

// Lenient on purpose: the type may be anything word-like and the scope may be
// empty so each rule can report its own violation instead of one parse error.
static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<type>[^(!:\s]+)(?:\((?P<scope>[^)]*)\))?!?:\s?(?P<subject>.*)$").unwrap());

/// Rules a commit header can violate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    TypeEnum,
    ScopeEmpty,
    SubjectEmpty,
    SubjectMaxLength,
    SubjectFullStop,
    HeaderFormat,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::TypeEnum => "type-enum",
            Rule::ScopeEmpty => "scope-empty",
            Rule::SubjectEmpty => "subject-empty",
            Rule::SubjectMaxLength => "subject-max-length",
            Rule::SubjectFullStop => "subject-full-stop",
            Rule::HeaderFormat => "header-format",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule violation with a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: Rule,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)
    }
}

/// Parsed commit header pieces. Fields are `None` when absent, which is
/// distinct from present-but-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub commit_type: Option<String>,
    pub scope: Option<String>,
    pub subject: Option<String>,
}

/// Result of linting one commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintReport {
    pub exempt: bool,
    pub header: Header,
    pub violations: Vec<Violation>,
}

impl LintReport {
    pub fn is_ok(&self) -> bool {
        self.exempt || self.violations.is_empty()
    }
}

/// Whether the message comes from an automated commit and bypasses linting.
pub fn is_exempt(message: &str) -> bool {
    EXEMPT_PREFIXES.iter().any(|p| message.starts_with(p))
}

/// Split the header line from a full commit message (body and trailers are
/// not linted).
fn header_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}

fn parse_header(line: &str) -> Header {
    match HEADER_RE.captures(line) {
        Some(caps) => Header {
            commit_type: caps.name("type").map(|m| m.as_str().to_string()),
            scope: caps.name("scope").map(|m| m.as_str().to_string()),
            subject: caps.name("subject").map(|m| m.as_str().to_string()),
        },
        None => Header::default(),
    }
}

/// Lint a full commit message and collect every violation.
pub fn lint(message: &str) -> LintReport {
    if is_exempt(message) {
        return LintReport {
            exempt: true,
            header: Header::default(),
            violations: Vec::new(),
        };
    }

    let line = header_line(message);
    let header = parse_header(line);
    let mut violations = Vec::new();

    match &header.commit_type {
        Some(t) if ALLOWED_TYPES.contains(&t.as_str()) => {}
        Some(t) => violations.push(Violation {
            rule: Rule::TypeEnum,
            message: format!(
                "type '{}' is not one of [{}]",
                t,
                ALLOWED_TYPES.join(", ")
            ),
        }),
        None => violations.push(Violation {
            rule: Rule::HeaderFormat,
            message: "header must look like 'type(scope): subject'".to_string(),
        }),
    }

    match header.scope.as_deref() {
        Some(s) if !s.trim().is_empty() => {}
        _ => violations.push(Violation {
            rule: Rule::ScopeEmpty,
            message: "a non-empty scope is required".to_string(),
        }),
    }

    let subject = header.subject.as_deref().unwrap_or("").trim();
    if subject.is_empty() {
        violations.push(Violation {
            rule: Rule::SubjectEmpty,
            message: "subject must not be empty".to_string(),
        });
    } else {
        if subject.chars().count() > MAX_SUBJECT_LENGTH {
            violations.push(Violation {
                rule: Rule::SubjectMaxLength,
                message: format!(
                    "subject is {} characters, maximum is {}",
                    subject.chars().count(),
                    MAX_SUBJECT_LENGTH
                ),
            });
        }
        if subject.ends_with('.') {
            violations.push(Violation {
                rule: Rule::SubjectFullStop,
                message: "subject must not end with a full stop".to_string(),
            });
        }
    }

    LintReport {
        exempt: false,
        header,
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(report: &LintReport) -> Vec<Rule> {
        report.violations.iter().map(|v| v.rule).collect()
    }

    #[test]
    fn well_formed_message_passes() {
        let report = lint("fix(auth): correct token expiry check");
        assert!(report.is_ok(), "violations: {:?}", report.violations);
        assert_eq!(report.header.commit_type.as_deref(), Some("fix"));
        assert_eq!(report.header.scope.as_deref(), Some("auth"));
    }

    #[test]
    fn missing_scope_and_trailing_period_both_reported() {
        let report = lint("fix: .");
        let rs = rules(&report);
        assert!(rs.contains(&Rule::ScopeEmpty));
        assert!(rs.contains(&Rule::SubjectFullStop));
        assert!(!rs.contains(&Rule::SubjectEmpty));
    }

    #[test]
    fn unknown_type_rejected() {
        let report = lint("feature(api): add bulk endpoint");
        assert_eq!(rules(&report), vec![Rule::TypeEnum]);
    }

    #[test]
    fn every_allowed_type_accepted() {
        for t in ALLOWED_TYPES {
            let report = lint(&format!("{t}(core): do the thing"));
            assert!(report.is_ok(), "type {t} should pass: {:?}", report.violations);
        }
    }

    #[test]
    fn empty_parenthesised_scope_is_still_empty() {
        let report = lint("feat(): something");
        assert_eq!(rules(&report), vec![Rule::ScopeEmpty]);
    }

    #[test]
    fn empty_subject_reported_once_without_length_or_stop_noise() {
        let report = lint("chore(deps): ");
        assert_eq!(rules(&report), vec![Rule::SubjectEmpty]);
    }

    #[test]
    fn subject_over_72_chars_rejected() {
        let long = "a".repeat(73);
        let report = lint(&format!("docs(readme): {long}"));
        assert_eq!(rules(&report), vec![Rule::SubjectMaxLength]);

        let exactly = "a".repeat(72);
        assert!(lint(&format!("docs(readme): {exactly}")).is_ok());
    }

    #[test]
    fn subject_length_counts_characters_not_bytes() {
        // 70 Hangul syllables are under the limit even though each is 3 bytes
        let hangul = "가".repeat(70);
        assert!(lint(&format!("feat(회원): {hangul}")).is_ok());
    }

    #[test]
    fn non_ascii_subject_allowed() {
        assert!(lint("feat(member): 회원 탈퇴 기능 추가").is_ok());
    }

    #[test]
    fn automated_commits_are_exempt() {
        for msg in [
            "Merge branch 'main' into develop",
            "Revert \"feat(auction): add relist\"",
            "fixup! fix(payment): guard refund amount",
            "squash! chore(ci): bump toolchain",
        ] {
            let report = lint(msg);
            assert!(report.exempt);
            assert!(report.is_ok());
        }
    }

    #[test]
    fn exemption_requires_prefix_position() {
        let report = lint("feat(core): Merge two code paths");
        assert!(!report.exempt);
        assert!(report.is_ok());
    }

    #[test]
    fn body_lines_are_not_linted() {
        let report = lint("fix(auth): correct token expiry check\n\nThis sentence ends with a period.");
        assert!(report.is_ok());
    }

    #[test]
    fn garbage_header_reports_format_scope_and_subject() {
        let report = lint("");
        let rs = rules(&report);
        assert!(rs.contains(&Rule::HeaderFormat));
        assert!(rs.contains(&Rule::ScopeEmpty));
        assert!(rs.contains(&Rule::SubjectEmpty));
    }

    #[test]
    fn breaking_change_marker_tolerated() {
        assert!(lint("feat(api)!: drop v1 routes").is_ok());
    }
}
