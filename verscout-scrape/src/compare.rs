use std::collections::BTreeSet;
use std::fmt;

/// Set difference between a fresh scrape and a snapshot. Both sides are
/// sorted so reports are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    /// In the scrape, not in the snapshot.
    pub added: BTreeSet<String>,
    /// In the snapshot, not in the scrape.
    pub missing: BTreeSet<String>,
}

impl Comparison {
    pub fn is_identical(&self) -> bool {
        self.added.is_empty() && self.missing.is_empty()
    }
}

/// `added = current − previous`, `missing = previous − current`.
pub fn compare<C, P>(current: C, previous: P) -> Comparison
where
    C: IntoIterator,
    C::Item: AsRef<str>,
    P: IntoIterator,
    P::Item: AsRef<str>,
{
    let current: BTreeSet<String> = current.into_iter().map(|v| v.as_ref().to_string()).collect();
    let previous: BTreeSet<String> = previous.into_iter().map(|v| v.as_ref().to_string()).collect();

    Comparison {
        added: current.difference(&previous).cloned().collect(),
        missing: previous.difference(&current).cloned().collect(),
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.added.is_empty() {
            writeln!(f, "No new versions found compared to the snapshot.")?;
        } else {
            writeln!(f, "New versions found (present in scraped data but not in the snapshot):")?;
            for v in &self.added {
                writeln!(f, "  - {v}")?;
            }
        }

        writeln!(f)?;
        if self.missing.is_empty() {
            writeln!(f, "No versions are missing compared to the snapshot.")?;
        } else {
            writeln!(f, "Versions missing (present in the snapshot but not in scraped data):")?;
            for v in &self.missing {
                writeln!(f, "  - {v}")?;
            }
        }

        if self.is_identical() {
            writeln!(f)?;
            writeln!(f, "The scraped versions and snapshot versions are identical.")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn comparing_with_itself_is_empty() {
        let s = ["5.0.0", "5.1.0", "6.0.0-dev.1"];
        let cmp = compare(s, s);
        assert!(cmp.is_identical());
    }

    #[test]
    fn reports_both_directions() {
        let cmp = compare(["A", "B"], ["B", "C"]);
        assert_eq!(cmp.added, set(&["A"]));
        assert_eq!(cmp.missing, set(&["C"]));
    }

    #[test]
    fn report_is_sorted() {
        let cmp = compare(["b", "a", "c"], Vec::<String>::new());
        let report = cmp.to_string();
        let a = report.find("  - a").unwrap();
        let b = report.find("  - b").unwrap();
        let c = report.find("  - c").unwrap();
        assert!(a < b && b < c);
        assert!(report.contains("No versions are missing"));
    }

    #[test]
    fn identical_report_says_so() {
        let report = compare(["1.0"], ["1.0"]).to_string();
        assert!(report.contains("identical"));
    }
}
