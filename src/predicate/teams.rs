//! Static team-alias tables and team-name extraction.
//!
//! Aliases are grouped per league and immutable after initialization.
//! Extraction is a linear scan, which is fine at this table size.

// ---------------------------------------------------------------------------
// Alias tables
// ---------------------------------------------------------------------------

pub(crate) struct LeagueTable {
    pub league: &'static str,
    pub aliases: &'static [&'static str],
}

pub(crate) const LEAGUE_TABLES: &[LeagueTable] = &[
    LeagueTable {
        league: "nba",
        aliases: &[
            "lakers", "warriors", "bulls", "heat", "knicks", "celtics", "nets", "sixers",
            "raptors", "magic", "hawks", "hornets", "pistons", "pacers", "cavaliers", "cavs",
            "bucks", "suns", "kings", "clippers", "nuggets", "timberwolves", "wolves",
            "thunder", "blazers", "jazz", "rockets", "spurs", "mavericks", "mavs",
            "grizzlies", "pelicans",
        ],
    },
    LeagueTable {
        league: "nfl",
        aliases: &[
            "patriots", "bills", "dolphins", "jets", "steelers", "ravens", "browns", "bengals",
            "titans", "colts", "texans", "jaguars", "chiefs", "raiders", "chargers", "broncos",
            "cowboys", "giants", "eagles", "commanders", "packers", "bears", "vikings", "lions",
            "falcons", "panthers", "saints", "buccaneers", "bucs", "cardinals", "rams",
            "seahawks", "49ers",
        ],
    },
    LeagueTable {
        league: "soccer",
        aliases: &[
            "manchester united", "man united", "united", "manchester city", "man city", "city",
            "liverpool", "chelsea", "arsenal", "tottenham", "spurs", "real madrid", "madrid",
            "barcelona", "barca", "psg", "bayern", "juventus", "juve",
        ],
    },
];

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract the predicted team from normalized (lowercased) text.
///
/// Resolution order: the earliest mention in the text wins (the predicted
/// team is the first one named); among aliases starting at the same
/// position the longer alias wins ("manchester united" over "united");
/// equal-length ties resolve to the alias encountered first in table order.
pub(crate) fn extract_team(text: &str) -> Option<String> {
    let mut best: Option<(usize, &'static str)> = None;

    for table in LEAGUE_TABLES {
        for alias in table.aliases {
            if let Some(pos) = text.find(alias) {
                let better = match best {
                    None => true,
                    Some((best_pos, best_alias)) => {
                        pos < best_pos || (pos == best_pos && alias.len() > best_alias.len())
                    }
                };
                if better {
                    best = Some((pos, alias));
                }
            }
        }
    }

    best.map(|(_, alias)| alias.to_string())
}

/// League the alias belongs to, if known.
#[allow(dead_code)]
pub(crate) fn league_of(alias: &str) -> Option<&'static str> {
    LEAGUE_TABLES
        .iter()
        .find(|t| t.aliases.contains(&alias))
        .map(|t| t.league)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_team() {
        assert_eq!(extract_team("the lakers look unstoppable"), Some("lakers".into()));
    }

    #[test]
    fn test_extract_earliest_mention_wins() {
        // "warriors" is the longer alias, but "lakers" is named first —
        // the prediction is about the lakers.
        assert_eq!(
            extract_team("lakers will beat warriors by 10+ points"),
            Some("lakers".into())
        );
        assert_eq!(
            extract_team("warriors will beat lakers tonight"),
            Some("warriors".into())
        );
    }

    #[test]
    fn test_extract_longest_alias_at_same_position() {
        // "manchester united" and "united" both match; the longer alias
        // starting at the same position wins.
        assert_eq!(
            extract_team("manchester united will win the derby"),
            Some("manchester united".into())
        );
    }

    #[test]
    fn test_extract_shorter_alias_when_alone() {
        assert_eq!(extract_team("united will win"), Some("united".into()));
    }

    #[test]
    fn test_extract_none() {
        assert_eq!(extract_team("someone will probably win"), None);
        assert_eq!(extract_team(""), None);
    }

    #[test]
    fn test_extract_nfl_and_soccer() {
        assert_eq!(extract_team("chiefs by a mile"), Some("chiefs".into()));
        assert_eq!(extract_team("barca to lift the cup"), Some("barca".into()));
    }

    #[test]
    fn test_league_of() {
        assert_eq!(league_of("lakers"), Some("nba"));
        assert_eq!(league_of("chiefs"), Some("nfl"));
        assert_eq!(league_of("psg"), Some("soccer"));
        assert_eq!(league_of("nobody"), None);
    }
}
