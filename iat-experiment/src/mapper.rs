use iat_core::ResponseMapping;

/// The six category→key mappings of one experiment.
///
/// With labels `[l0, l1, l2, l3]` and keys `[left, right]`, dimension 1 is
/// `l0/l1` and dimension 2 is `l2/l3`. Both combined mappings put dimension 2
/// in its inverted orientation and differ only in the orientation of
/// dimension 1, so the two combined blocks pit the same key assignment of
/// dimension 2 against both sides of dimension 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMappings {
    pub base_1: ResponseMapping,
    pub inverse_1: ResponseMapping,
    pub base_2: ResponseMapping,
    pub inverse_2: ResponseMapping,
    /// `inverse_2 ∪ inverse_1`
    pub union_a: ResponseMapping,
    /// `inverse_2 ∪ base_1`
    pub union_b: ResponseMapping,
}

impl ResponseMappings {
    pub fn build<L: AsRef<str>, K: AsRef<str>>(labels: &[L], keys: &[K]) -> Self {
        let split = labels.len().min(2);
        let base_1 = ResponseMapping::from_pairs(&labels[..split], keys);
        let base_2 = ResponseMapping::from_pairs(&labels[split..], keys);
        let inverse_1 = base_1.inverted();
        let inverse_2 = base_2.inverted();
        let union_a = inverse_2.union(&inverse_1);
        let union_b = inverse_2.union(&base_1);
        Self {
            base_1,
            inverse_1,
            base_2,
            inverse_2,
            union_a,
            union_b,
        }
    }

    /// base-1, inverse-1, base-2, inverse-2, union-A, union-B.
    pub fn ordered(&self) -> [&ResponseMapping; 6] {
        [
            &self.base_1,
            &self.inverse_1,
            &self.base_2,
            &self.inverse_2,
            &self.union_a,
            &self.union_b,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iat_core::Label;

    const LABELS: [&str; 4] = ["Other", "Self", "Science", "Liberal Arts"];
    const KEYS: [&str; 2] = ["e", "i"];

    fn key_of<'a>(m: &'a ResponseMapping, label: &str) -> &'a str {
        m.get(label).map(|k| &**k).unwrap_or("-")
    }

    #[test]
    fn matches_reference_assignments() {
        let m = ResponseMappings::build(&LABELS, &KEYS);
        assert_eq!(key_of(&m.base_1, "Other"), "e");
        assert_eq!(key_of(&m.base_1, "Self"), "i");
        assert_eq!(key_of(&m.inverse_1, "Other"), "i");
        assert_eq!(key_of(&m.inverse_2, "Science"), "i");
        assert_eq!(key_of(&m.inverse_2, "Liberal Arts"), "e");

        let a: Vec<(&str, &str)> = m.union_a.iter().map(|(l, k)| (&**l, &**k)).collect();
        assert_eq!(
            a,
            [("Science", "i"), ("Liberal Arts", "e"), ("Other", "i"), ("Self", "e")]
        );
        assert_eq!(key_of(&m.union_b, "Other"), "e");
        assert_eq!(key_of(&m.union_b, "Self"), "i");
    }

    #[test]
    fn inverses_swap_keys_over_the_same_labels() {
        let m = ResponseMappings::build(&LABELS, &KEYS);
        for (base, inverse) in [(&m.base_1, &m.inverse_1), (&m.base_2, &m.inverse_2)] {
            let labels: Vec<&Label> = base.labels().collect();
            assert_eq!(labels, inverse.labels().collect::<Vec<_>>());
            for label in labels {
                assert_ne!(base.get(label), inverse.get(label));
            }
            assert_eq!(base.keys().len(), 2);
        }
    }

    #[test]
    fn unions_cover_every_label_once() {
        let m = ResponseMappings::build(&LABELS, &KEYS);
        for union in [&m.union_a, &m.union_b] {
            assert_eq!(union.len(), 4);
            for label in LABELS {
                assert!(union.get(label).is_some());
            }
            assert_eq!(union.keys().len(), 2);
        }
        assert_ne!(m.union_a, m.union_b);
    }

    #[test]
    fn construction_is_deterministic() {
        let first = ResponseMappings::build(&LABELS, &KEYS);
        let second = ResponseMappings::build(&LABELS, &KEYS);
        assert_eq!(first, second);
        assert_eq!(first.ordered()[3], &first.inverse_2);
    }
}
