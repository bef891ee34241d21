//! Distribution-set planning.
//!
//! Maps a release id (`4.3`, `9.1`, ...) to the ordered list of distribution
//! sets that release is expected to provide. Pure and total: no I/O, never
//! fails, and an unrecognized (future) release id degrades to the
//! newest-known rule set.
//!
//! The mapping is an ordered rule list evaluated top to bottom. Each rule is
//! a predicate over the dotted release id plus the set names it contributes;
//! every matching rule appends, so the output order is the table order:
//! base, compat, crypto, docs, standard extras, kernels. The version
//! boundaries follow actual FreeBSD release history (compat4x first shipped
//! in 4.3, crypto folded into base in 5.3, the SMP kernel set appeared in
//! 6.1) and must not be "simplified" into continuous ranges.

mod release_id;

pub use release_id::ReleaseId;

/// A named distribution set, e.g. `base/base` or `kernels/generic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Slash-qualified set name.
    pub name: String,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The portion before the last slash, if any.
    pub fn group(&self) -> Option<&str> {
        self.name.rsplit_once('/').map(|(group, _)| group)
    }

    /// Display label: the group, or the full name for ungrouped sets.
    pub fn label(&self) -> &str {
        self.group().unwrap_or(&self.name)
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

struct Rule {
    tag: &'static str,
    applies: fn(&ReleaseId) -> bool,
    adds: &'static [&'static str],
}

const STANDARD_EXTRAS: &[&str] = &[
    "dict/dict",
    "games/games",
    "info/info",
    "manpages/manpages",
    "proflibs/proflibs",
];

const RULES: &[Rule] = &[
    // Base set: exactly one of these three matches.
    Rule { tag: "base-1.x", applies: base_1x, adds: &["tarballs/bindist/bin_tgz"] },
    Rule { tag: "base-bin", applies: base_bin, adds: &["bin/bin"] },
    Rule { tag: "base-base", applies: base_base, adds: &["base/base"] },
    // Compat sets, 2.x through 5.x only.
    Rule { tag: "compat1x", applies: compat1x, adds: &["compat1x/compat1x"] },
    Rule { tag: "compat20", applies: compat20_only, adds: &["compat20/compat20"] },
    Rule {
        tag: "compat20-21",
        applies: compat20_and_21,
        adds: &["compat20/compat20", "compat21/compat21"],
    },
    Rule { tag: "compat22-3.x", applies: compat22_for_3x, adds: &["compat22/compat22"] },
    Rule {
        tag: "compat-4.x-5.x",
        applies: compat_4x_5x,
        adds: &["compat22/compat22", "compat3x/compat3x"],
    },
    Rule { tag: "compat4x", applies: compat4x_available, adds: &["compat4x/compat4x"] },
    // Crypto: des until 3.x, crypto until 5.2, folded into base from 5.3.
    Rule { tag: "crypto-des", applies: crypto_des, adds: &["des/des"] },
    Rule { tag: "crypto", applies: crypto_set, adds: &["crypto/crypto"] },
    // Docs and standard extras.
    Rule { tag: "docs", applies: docs_shipped, adds: &["doc/doc"] },
    Rule { tag: "extras", applies: extras_shipped, adds: STANDARD_EXTRAS },
    // Kernel sets: separate from base since 6.1; SMP variant only in 6.x.
    Rule {
        tag: "kernels-6.x",
        applies: kernels_generic_and_smp,
        adds: &["kernels/generic", "kernels/smp"],
    },
    Rule { tag: "kernels-generic", applies: kernels_generic_only, adds: &["kernels/generic"] },
];

/// Plan the ordered distribution-set list for a release id.
///
/// # Example
///
/// ```rust,ignore
/// use mkjail::planner::plan;
///
/// let sets = plan("9.1");
/// assert_eq!(sets[0].name, "base/base");
/// ```
pub fn plan(release_id: &str) -> Vec<Component> {
    let id = ReleaseId::new(release_id);
    let mut out = Vec::new();
    for rule in RULES {
        if (rule.applies)(&id) {
            log::trace!("release {}: rule '{}' applies", release_id, rule.tag);
            out.extend(rule.adds.iter().map(|name| Component::new(*name)));
        }
    }
    out
}

// Majors 1 through 8 are the known rule sets; anything else (future majors,
// -CURRENT oddities) falls through to the newest-known arms below.

fn base_1x(id: &ReleaseId) -> bool {
    id.known_major() == Some(1)
}

fn base_bin(id: &ReleaseId) -> bool {
    matches!(id.known_major(), Some(2..=4))
}

fn base_base(id: &ReleaseId) -> bool {
    !matches!(id.known_major(), Some(1..=4))
}

fn compat1x(id: &ReleaseId) -> bool {
    matches!(id.known_major(), Some(2..=3))
}

// 2.0.x and 2.1.7.1 predate compat21; 2.1.7.1 is an exact match so that its
// sibling 2.1.7 falls through to the generic 2.x arm.
fn compat20_only(id: &ReleaseId) -> bool {
    id.has_prefix("2.0") || id.is("2.1.7.1")
}

fn compat20_and_21(id: &ReleaseId) -> bool {
    (id.known_major() == Some(2) && !compat20_only(id)) || id.has_prefix("3.0")
}

fn compat22_for_3x(id: &ReleaseId) -> bool {
    id.known_major() == Some(3) && !id.has_prefix("3.0")
}

fn compat_4x_5x(id: &ReleaseId) -> bool {
    matches!(id.known_major(), Some(4..=5))
}

// compat4x did not exist before 4.3.
fn compat4x_available(id: &ReleaseId) -> bool {
    compat_4x_5x(id)
        && !id.has_prefix("4.0")
        && !id.has_prefix("4.1")
        && !id.has_prefix("4.2")
}

fn crypto_des(id: &ReleaseId) -> bool {
    matches!(id.known_major(), Some(2..=3))
}

fn crypto_set(id: &ReleaseId) -> bool {
    id.known_major() == Some(4)
        || id.has_prefix("5.0")
        || id.has_prefix("5.1")
        || id.has_prefix("5.2")
}

// Docs shipped with everything except 1.x and 2.0.x.
fn docs_shipped(id: &ReleaseId) -> bool {
    !(id.known_major() == Some(1) || id.has_prefix("2.0"))
}

fn extras_shipped(id: &ReleaseId) -> bool {
    id.known_major() != Some(1)
}

fn kernels_generic_and_smp(id: &ReleaseId) -> bool {
    id.known_major() == Some(6) && !id.has_prefix("6.0")
}

fn kernels_generic_only(id: &ReleaseId) -> bool {
    matches!(id.known_major(), Some(7..=8)) || id.known_major().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(release_id: &str) -> Vec<String> {
        plan(release_id).into_iter().map(|c| c.name).collect()
    }

    #[test]
    fn test_plan_1x_is_bindist_only() {
        assert_eq!(names("1.5"), vec!["tarballs/bindist/bin_tgz"]);
        assert_eq!(names("1.1.5.1"), vec!["tarballs/bindist/bin_tgz"]);
    }

    #[test]
    fn test_plan_4_3() {
        assert_eq!(
            names("4.3"),
            vec![
                "bin/bin",
                "compat22/compat22",
                "compat3x/compat3x",
                "compat4x/compat4x",
                "crypto/crypto",
                "doc/doc",
                "dict/dict",
                "games/games",
                "info/info",
                "manpages/manpages",
                "proflibs/proflibs",
            ]
        );
    }

    #[test]
    fn test_plan_early_4x_has_no_compat4x() {
        for id in ["4.0", "4.1", "4.1.1", "4.2"] {
            assert!(
                !names(id).contains(&"compat4x/compat4x".to_string()),
                "compat4x should be absent for {}",
                id
            );
        }
        assert!(names("4.11").contains(&"compat4x/compat4x".to_string()));
    }

    #[test]
    fn test_plan_2_0x_gets_compat20_only() {
        let sets = names("2.0.5");
        assert!(sets.contains(&"compat1x/compat1x".to_string()));
        assert!(sets.contains(&"compat20/compat20".to_string()));
        assert!(!sets.contains(&"compat21/compat21".to_string()));
        // 2.0.x shipped no doc set but did ship the extras.
        assert!(!sets.contains(&"doc/doc".to_string()));
        assert!(sets.contains(&"dict/dict".to_string()));
    }

    #[test]
    fn test_plan_2_1_7_1_exact_match() {
        let special = names("2.1.7.1");
        assert!(special.contains(&"compat20/compat20".to_string()));
        assert!(!special.contains(&"compat21/compat21".to_string()));

        // Its sibling 2.1.7 takes the generic 2.x arm.
        let sibling = names("2.1.7");
        assert!(sibling.contains(&"compat20/compat20".to_string()));
        assert!(sibling.contains(&"compat21/compat21".to_string()));
    }

    #[test]
    fn test_plan_3x_compat_boundary() {
        let three_oh = names("3.0");
        assert!(three_oh.contains(&"compat20/compat20".to_string()));
        assert!(three_oh.contains(&"compat21/compat21".to_string()));
        assert!(!three_oh.contains(&"compat22/compat22".to_string()));

        let later = names("3.4");
        assert!(later.contains(&"compat22/compat22".to_string()));
        assert!(!later.contains(&"compat20/compat20".to_string()));
        assert!(later.contains(&"des/des".to_string()));
    }

    #[test]
    fn test_plan_crypto_folds_into_base_at_5_3() {
        assert!(names("5.2.1").contains(&"crypto/crypto".to_string()));
        assert!(!names("5.3").contains(&"crypto/crypto".to_string()));
        assert!(!names("5.3").iter().any(|n| n.starts_with("des/")));
    }

    #[test]
    fn test_plan_kernel_sets() {
        let six_oh = names("6.0");
        assert!(!six_oh.iter().any(|n| n.starts_with("kernels/")));

        let six_one = names("6.1");
        assert!(six_one.contains(&"kernels/generic".to_string()));
        assert!(six_one.contains(&"kernels/smp".to_string()));

        let seven = names("7.2");
        assert!(seven.contains(&"kernels/generic".to_string()));
        assert!(!seven.contains(&"kernels/smp".to_string()));
    }

    #[test]
    fn test_plan_future_release_falls_back() {
        assert_eq!(
            names("9.0"),
            vec![
                "base/base",
                "doc/doc",
                "dict/dict",
                "games/games",
                "info/info",
                "manpages/manpages",
                "proflibs/proflibs",
                "kernels/generic",
            ]
        );
        // Same fallback for a non-numeric id.
        assert_eq!(names("HEAD"), names("42.1"));
    }

    #[test]
    fn test_component_labels() {
        let set = Component::new("kernels/generic");
        assert_eq!(set.group(), Some("kernels"));
        assert_eq!(set.label(), "kernels");

        let nested = Component::new("tarballs/bindist/bin_tgz");
        assert_eq!(nested.group(), Some("tarballs/bindist"));

        let bare = Component::new("standalone");
        assert_eq!(bare.group(), None);
        assert_eq!(bare.label(), "standalone");
    }
}
