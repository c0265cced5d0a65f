//! Table-driven checks of the commit message rules enforced by the
//! `lint-commit` hook.

use rarebid::commitlint::{lint, Rule, ALLOWED_TYPES};

#[test]
fn accepted_messages() {
    let good = [
        "fix(auth): correct token expiry check",
        "feat(auction): add bookmark endpoints",
        "docs(readme): describe settlement batch",
        "style(payment): reorder imports",
        "refactor(member): split profile update",
        "test(wallet): cover hold over free balance",
        "chore(deps): bump tokio",
        "feat(member): 회원 프로필 수정 기능",
    ];
    for message in good {
        let report = lint(message);
        assert!(
            report.is_ok(),
            "{message:?} should pass but got {:?}",
            report.violations
        );
    }
}

#[test]
fn rejected_messages_carry_the_right_rules() {
    let cases: [(&str, &[Rule]); 6] = [
        ("feature(api): add thing", &[Rule::TypeEnum]),
        ("fix: broken thing", &[Rule::ScopeEmpty]),
        ("fix(): broken thing", &[Rule::ScopeEmpty]),
        ("fix(auth): ", &[Rule::SubjectEmpty]),
        ("fix(auth): ends with a period.", &[Rule::SubjectFullStop]),
        ("fix: .", &[Rule::ScopeEmpty, Rule::SubjectFullStop]),
    ];

    for (message, expected) in cases {
        let report = lint(message);
        let rules: Vec<Rule> = report.violations.iter().map(|v| v.rule).collect();
        for rule in expected {
            assert!(
                rules.contains(rule),
                "{message:?} should violate {rule:?}, got {rules:?}"
            );
        }
        assert!(!report.is_ok(), "{message:?} should fail");
    }
}

#[test]
fn subject_length_boundary() {
    let at_limit = format!("chore(ci): {}", "x".repeat(72));
    assert!(lint(&at_limit).is_ok());

    let over_limit = format!("chore(ci): {}", "x".repeat(73));
    let report = lint(&over_limit);
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].rule, Rule::SubjectMaxLength);
}

#[test]
fn automated_commits_bypass_every_rule() {
    let automated = [
        "Merge pull request #42 from fork/feature",
        "Revert \"feat(auction): add relist\"",
        "fixup! anything goes here, even a period.",
        "squash! no type no scope",
    ];
    for message in automated {
        let report = lint(message);
        assert!(report.exempt, "{message:?} should be exempt");
        assert!(report.is_ok());
    }
}

#[test]
fn type_list_matches_the_convention() {
    assert_eq!(
        ALLOWED_TYPES,
        ["feat", "fix", "docs", "style", "refactor", "test", "chore"]
    );
}

#[test]
fn only_the_header_line_is_linted() {
    let with_body = "feat(payment): add refund flow\n\nLong explanation. With periods. And more than seventy-two characters of text in this body line.";
    assert!(lint(with_body).is_ok());
}
