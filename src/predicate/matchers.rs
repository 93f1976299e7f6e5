//! Ordered predicate matchers.
//!
//! Each matcher recognizes one prediction shape. The pipeline in
//! `MATCHERS` is tried in fixed priority order and the first match wins,
//! which keeps the priority explicit and each matcher independently
//! testable.

use regex::Regex;
use std::sync::LazyLock;

use super::teams::extract_team;
use super::{Direction, Predicate};

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*-\s*(\d+)").unwrap());

static BARE_SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*-\s*\d+$").unwrap());

static MARGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"by\s+(\d+)\s*\+?\s*points?").unwrap());

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

// ---------------------------------------------------------------------------
// Matcher trait & pipeline
// ---------------------------------------------------------------------------

/// One prediction shape. `try_parse` receives lowercased text and
/// returns `None` when the shape does not apply.
pub(crate) trait Matcher: Sync {
    fn name(&self) -> &'static str;
    fn try_parse(&self, text: &str) -> Option<Predicate>;
}

/// First-match-wins pipeline, in priority order.
pub(crate) static MATCHERS: &[&dyn Matcher] = &[
    &ExactScoreMatcher,
    &MarginMatcher,
    &OverUnderMatcher,
    &MoneylineMatcher,
    &FirstToScoreMatcher,
    &TeamFallbackMatcher,
];

// ---------------------------------------------------------------------------
// Matchers
// ---------------------------------------------------------------------------

/// `"final score will be 112-108"` — or a bare `"112-108"`, which is
/// unambiguous even without the word "score". Captures are home-away in
/// textual order.
pub(crate) struct ExactScoreMatcher;

impl Matcher for ExactScoreMatcher {
    fn name(&self) -> &'static str {
        "exact-score"
    }

    fn try_parse(&self, text: &str) -> Option<Predicate> {
        if !text.contains("score") && !BARE_SCORE_RE.is_match(text.trim()) {
            return None;
        }
        let caps = SCORE_RE.captures(text)?;
        let home = caps[1].parse().ok()?;
        let away = caps[2].parse().ok()?;
        Some(Predicate::ExactScore { home, away })
    }
}

/// `"Lakers will beat Warriors by 10+ points"` — needs "by", a points
/// word, a numeric margin, and an extractable team.
pub(crate) struct MarginMatcher;

impl Matcher for MarginMatcher {
    fn name(&self) -> &'static str {
        "margin"
    }

    fn try_parse(&self, text: &str) -> Option<Predicate> {
        if !text.contains("by") || !text.contains("point") {
            return None;
        }
        let caps = MARGIN_RE.captures(text)?;
        let min_margin = caps[1].parse().ok()?;
        let team = extract_team(text)?;
        Some(Predicate::Margin { team, min_margin })
    }
}

/// `"Over 220 total points"` / `"under 44.5"`. "over" takes precedence
/// when both words appear.
pub(crate) struct OverUnderMatcher;

impl Matcher for OverUnderMatcher {
    fn name(&self) -> &'static str {
        "over-under"
    }

    fn try_parse(&self, text: &str) -> Option<Predicate> {
        let direction = if text.contains("over") {
            Direction::Over
        } else if text.contains("under") {
            Direction::Under
        } else {
            return None;
        };
        let threshold = NUMBER_RE.find(text)?.as_str().parse().ok()?;
        Some(Predicate::OverUnder { direction, threshold })
    }
}

/// `"Lakers will win"` / `"will beat"` / `"beats"` plus a team.
pub(crate) struct MoneylineMatcher;

impl Matcher for MoneylineMatcher {
    fn name(&self) -> &'static str {
        "moneyline"
    }

    fn try_parse(&self, text: &str) -> Option<Predicate> {
        if !text.contains("will win") && !text.contains("will beat") && !text.contains("beats") {
            return None;
        }
        let team = extract_team(text)?;
        Some(Predicate::Moneyline { team })
    }
}

/// `"first to score"` predictions. There is no play-by-play data, so
/// these always lose downstream, but the variant stays distinct rather
/// than collapsing into `Unknown`.
pub(crate) struct FirstToScoreMatcher;

impl Matcher for FirstToScoreMatcher {
    fn name(&self) -> &'static str {
        "first-to-score"
    }

    fn try_parse(&self, text: &str) -> Option<Predicate> {
        if !text.contains("first") || !text.contains("score") {
            return None;
        }
        let team = extract_team(text)?;
        Some(Predicate::FirstToScore { team })
    }
}

/// Last resort: any extractable team reads as a moneyline pick.
pub(crate) struct TeamFallbackMatcher;

impl Matcher for TeamFallbackMatcher {
    fn name(&self) -> &'static str {
        "team-fallback"
    }

    fn try_parse(&self, text: &str) -> Option<Predicate> {
        let team = extract_team(text)?;
        Some(Predicate::Moneyline { team })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_score_with_keyword() {
        let p = ExactScoreMatcher.try_parse("final score will be 112-108");
        assert_eq!(p, Some(Predicate::ExactScore { home: 112, away: 108 }));
    }

    #[test]
    fn test_exact_score_bare() {
        let p = ExactScoreMatcher.try_parse("112-108");
        assert_eq!(p, Some(Predicate::ExactScore { home: 112, away: 108 }));
        let p = ExactScoreMatcher.try_parse("  112 - 108 ");
        assert_eq!(p, Some(Predicate::ExactScore { home: 112, away: 108 }));
    }

    #[test]
    fn test_exact_score_requires_keyword_or_bare() {
        // Has a dash pattern but neither the keyword nor a bare score line.
        assert_eq!(ExactScoreMatcher.try_parse("lakers 112-108 easily"), None);
        // Keyword but no score pattern.
        assert_eq!(ExactScoreMatcher.try_parse("they will score a lot"), None);
    }

    #[test]
    fn test_margin_variants() {
        assert_eq!(
            MarginMatcher.try_parse("lakers will beat warriors by 10+ points"),
            Some(Predicate::Margin { team: "lakers".into(), min_margin: 10 })
        );
        assert_eq!(
            MarginMatcher.try_parse("chiefs win by 7 points"),
            Some(Predicate::Margin { team: "chiefs".into(), min_margin: 7 })
        );
        assert_eq!(
            MarginMatcher.try_parse("celtics by 1 point"),
            Some(Predicate::Margin { team: "celtics".into(), min_margin: 1 })
        );
    }

    #[test]
    fn test_margin_requires_team_and_number() {
        assert_eq!(MarginMatcher.try_parse("someone wins by 10 points"), None);
        assert_eq!(MarginMatcher.try_parse("lakers by many points"), None);
    }

    #[test]
    fn test_over_under() {
        assert_eq!(
            OverUnderMatcher.try_parse("over 220 total points"),
            Some(Predicate::OverUnder { direction: Direction::Over, threshold: 220.0 })
        );
        assert_eq!(
            OverUnderMatcher.try_parse("under 44.5"),
            Some(Predicate::OverUnder { direction: Direction::Under, threshold: 44.5 })
        );
    }

    #[test]
    fn test_over_wins_when_both_words_present() {
        assert_eq!(
            OverUnderMatcher.try_parse("over not under 200"),
            Some(Predicate::OverUnder { direction: Direction::Over, threshold: 200.0 })
        );
    }

    #[test]
    fn test_over_under_requires_number() {
        assert_eq!(OverUnderMatcher.try_parse("way over the line"), None);
    }

    #[test]
    fn test_moneyline_verbs() {
        for text in [
            "lakers will win",
            "lakers will beat the warriors",
            "lakers beats everyone",
        ] {
            assert_eq!(
                MoneylineMatcher.try_parse(text),
                Some(Predicate::Moneyline { team: "lakers".into() }),
                "{text}"
            );
        }
    }

    #[test]
    fn test_moneyline_requires_team() {
        assert_eq!(MoneylineMatcher.try_parse("my team will win"), None);
    }

    #[test]
    fn test_first_to_score() {
        assert_eq!(
            FirstToScoreMatcher.try_parse("warriors first to score"),
            Some(Predicate::FirstToScore { team: "warriors".into() })
        );
        assert_eq!(FirstToScoreMatcher.try_parse("first half will be close"), None);
    }

    #[test]
    fn test_team_fallback() {
        assert_eq!(
            TeamFallbackMatcher.try_parse("lakers in six"),
            Some(Predicate::Moneyline { team: "lakers".into() })
        );
        assert_eq!(TeamFallbackMatcher.try_parse("no teams here"), None);
    }

    #[test]
    fn test_pipeline_order() {
        let names: Vec<_> = MATCHERS.iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec![
                "exact-score",
                "margin",
                "over-under",
                "moneyline",
                "first-to-score",
                "team-fallback",
            ]
        );
    }
}
