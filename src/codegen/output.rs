//! Output UUIDs and custom output names.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

pub fn new_uuid() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

#[derive(Debug, Default)]
pub struct OutputNames {
    uuids: HashMap<String, String>,
    taken: HashSet<String>,
}

impl OutputNames {
    /// Reserve names that temporaries must never take.
    pub fn reserve<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        self.taken.extend(names.into_iter().map(str::to_string));
    }

    /// The UUID for an output name, allocated on first use.
    pub fn uuid_for(&mut self, name: &str) -> String {
        self.uuids.entry(name.to_string()).or_insert_with(new_uuid).clone()
    }

    /// An output name that has not been handed out yet: `base`, then
    /// `base1`, `base2`, ... A trailing number on `base` continues the
    /// series instead of starting a new one.
    pub fn fresh_name(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
        let mut n: u64 = base[stem.len()..].parse().unwrap_or(0);
        loop {
            let Some(next) = n.checked_add(1) else {
                return self.fresh_name(&format!("{base}_"));
            };
            n = next;
            let candidate = format!("{stem}{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuids_are_cached_per_name() {
        let mut outputs = OutputNames::default();
        let first = outputs.uuid_for("greet");
        assert_eq!(outputs.uuid_for("greet"), first);
        assert_ne!(outputs.uuid_for("other"), first);
        assert_eq!(first, first.to_uppercase());
    }

    #[test]
    fn colliding_names_get_suffixes() {
        let mut outputs = OutputNames::default();
        outputs.reserve(["text"]);
        assert_eq!(outputs.fresh_name("text"), "text1");
        assert_eq!(outputs.fresh_name("text"), "text2");
        assert_eq!(outputs.fresh_name("number"), "number");
    }

    #[test]
    fn trailing_digits_continue_the_series() {
        let mut outputs = OutputNames::default();
        assert_eq!(outputs.fresh_name("item7"), "item7");
        assert_eq!(outputs.fresh_name("item7"), "item8");
    }

    #[test]
    fn exhausted_series_starts_a_new_stem() {
        let mut outputs = OutputNames::default();
        let base = format!("x{}", u64::MAX);
        assert_eq!(outputs.fresh_name(&base), base);
        assert_eq!(outputs.fresh_name(&base), format!("{base}_"));
        assert_eq!(outputs.fresh_name(&base), format!("{base}_1"));
    }
}
