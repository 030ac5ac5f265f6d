use serde::{Serialize, Deserialize};

pub const DEFAULT_CATEGORIES: [&str; 3] = [
    "Ranelad of the Year",
    "Worst Ranelad of the Year",
    "Most Improved Ranelad",
];

pub const DEFAULT_VOTERS: [&str; 22] = [
    "Boydie", "Carl", "Con", "Cramps", "David", "Enda", "Gibb", "Hugo",
    "Jack", "Jam", "Josh", "Kill", "Lorcan", "Monz", "Ois", "Ollie",
    "Pauly", "Petch", "Rob", "Simo", "Thilo", "Vinny",
];

/// The closed set of people who may vote or be nominated, and the award
/// categories on offer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub voters: Vec<String>,
    pub categories: Vec<String>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(DEFAULT_VOTERS, DEFAULT_CATEGORIES)
    }
}

impl Roster {
    /// Names are trimmed and blanks dropped. Voters are sorted; categories keep
    /// their given order. Duplicates are removed from both.
    pub fn new<V, C>(voters: V, categories: C) -> Self
    where
        V: IntoIterator,
        V::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut voters = clean(voters);
        voters.sort();
        voters.dedup();

        let mut seen = Vec::new();
        for category in clean(categories) {
            if !seen.contains(&category) {
                seen.push(category);
            }
        }

        Self { voters, categories: seen }
    }

    pub fn is_member(&self, name: &str) -> bool {
        self.voters.iter().any(|v| v == name)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// Splits a comma separated list, as used for roster overrides in configuration.
pub fn parse_list(raw: &str) -> Vec<String> {
    clean(raw.split(','))
}

fn clean<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names.into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}
