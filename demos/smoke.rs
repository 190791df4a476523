//! Smoke test for ruleac

use ruleac::{Accumulator, Config, RuleMatcher, SharedRuleMatcher};

fn main() {
    env_logger::init();
    println!("Running ruleac smoke tests...\n");

    test_literal();
    test_and_or();
    test_not();
    test_grouping();
    test_shared_operands();
    test_unicode();
    test_malformed();
    test_decode_error();
    test_untrimmed();
    test_shared_matcher();

    println!("\n✅ All smoke tests passed!");
}

fn test_literal() {
    let mut m = RuleMatcher::new();
    m.register_rule("needle").unwrap();

    assert_eq!(m.match_text("haystack with a needle").unwrap(), vec!["needle"]);
    assert!(m.match_text("haystack").unwrap().is_empty());
    println!("✓ Literal");
}

fn test_and_or() {
    let mut m = RuleMatcher::new();
    m.register_rule("cat & dog").unwrap();
    m.register_rule("cat | dog").unwrap();

    assert_eq!(
        m.match_text("raining cats and dogs").unwrap(),
        vec!["cat & dog", "cat | dog"]
    );
    assert_eq!(m.match_text("hot dog").unwrap(), vec!["cat | dog"]);
    println!("✓ AND / OR");
}

fn test_not() {
    let mut m = RuleMatcher::new();
    m.register_rule("eggs & spam !").unwrap();
    m.register_rule("spam !").unwrap();

    assert_eq!(
        m.match_text("eggs and ham").unwrap(),
        vec!["eggs & spam !", "spam !"]
    );
    assert!(m.match_text("eggs and spam").unwrap().is_empty());
    assert_eq!(m.match_text("").unwrap(), vec!["spam !"]);
    println!("✓ NOT");
}

fn test_grouping() {
    let mut m = RuleMatcher::new();
    m.register_rule("(foo | bar) & baz").unwrap();

    assert!(m.is_match("bar baz").unwrap());
    assert!(!m.is_match("foo bar").unwrap());
    println!("✓ Grouping");
}

fn test_shared_operands() {
    let mut m = RuleMatcher::new();
    m.register_rules(["foo & bar", "foo | qux", "foo !"]);

    let mut acc = Accumulator::new();
    for _ in 0..3 {
        assert_eq!(
            m.match_with("foo bar", &mut acc).unwrap(),
            vec!["foo & bar", "foo | qux"]
        );
    }
    println!("✓ Shared operands, reused accumulator");
}

fn test_unicode() {
    let mut m = RuleMatcher::new();
    m.register_rule("café & 日本").unwrap();

    assert!(m.is_match("un café à 日本").unwrap());
    assert!(!m.is_match("cafe 日本").unwrap());
    println!("✓ Unicode operands");
}

fn test_malformed() {
    let mut m = RuleMatcher::new();
    for bad in ["", "a & | b", "(a | b", "a )", "()", "a &"] {
        assert!(m.register_rule(bad).is_err(), "accepted {:?}", bad);
    }
    assert!(m.is_empty());
    println!("✓ Malformed rules rejected");
}

fn test_decode_error() {
    let mut m = RuleMatcher::new();
    m.register_rule("a").unwrap();

    assert!(m.match_text(&[b'a', 0xFF][..]).is_err());
    println!("✓ Invalid UTF-8 text reported");
}

fn test_untrimmed() {
    let mut m = RuleMatcher::with_config(Config::new().with_trim_operands(false));
    m.register_rule("foo | bar").unwrap();

    assert!(m.is_match("foo bar").unwrap());
    assert!(!m.is_match("foobar").unwrap());
    println!("✓ Untrimmed operands");
}

fn test_shared_matcher() {
    let m = SharedRuleMatcher::new();
    m.register_rule("alpha & beta").unwrap();
    let before = m.snapshot();
    m.register_rule("gamma").unwrap();

    assert_eq!(before.len(), 1);
    assert_eq!(m.len(), 2);
    assert!(m.is_match("gamma").unwrap());
    println!("✓ Shared matcher snapshots");
}
