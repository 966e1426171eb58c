/// NFL team nicknames as they appear in lower-cased questions, with the
/// display name used when the question does not name the team more fully.
pub(crate) const NFL_TEAMS: &[(&str, &str)] = &[
    ("cardinals", "Cardinals"),
    ("falcons", "Falcons"),
    ("ravens", "Ravens"),
    ("bills", "Bills"),
    ("panthers", "Panthers"),
    ("bears", "Bears"),
    ("bengals", "Bengals"),
    ("browns", "Browns"),
    ("cowboys", "Cowboys"),
    ("broncos", "Broncos"),
    ("lions", "Lions"),
    ("packers", "Packers"),
    ("texans", "Texans"),
    ("colts", "Colts"),
    ("jaguars", "Jaguars"),
    ("jags", "Jaguars"),
    ("chiefs", "Chiefs"),
    ("raiders", "Raiders"),
    ("chargers", "Chargers"),
    ("rams", "Rams"),
    ("dolphins", "Dolphins"),
    ("vikings", "Vikings"),
    ("patriots", "Patriots"),
    ("pats", "Patriots"),
    ("saints", "Saints"),
    ("giants", "Giants"),
    ("jets", "Jets"),
    ("eagles", "Eagles"),
    ("steelers", "Steelers"),
    ("49ers", "49ers"),
    ("niners", "49ers"),
    ("seahawks", "Seahawks"),
    ("buccaneers", "Buccaneers"),
    ("bucs", "Buccaneers"),
    ("titans", "Titans"),
    ("commanders", "Commanders"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn covers_every_franchise() {
        let names: HashSet<&str> = NFL_TEAMS.iter().map(|(_, display)| *display).collect();
        assert_eq!(names.len(), 32);
    }

    #[test]
    fn keys_are_lowercase() {
        for (key, _) in NFL_TEAMS {
            assert_eq!(*key, key.to_lowercase());
        }
    }
}
