//! Separator reinsertion.
//!
//! A pattern's capture groups only cover the meaningful runs of a value (plus
//! the `(.*)` tail). To render the full value, each processed group is put
//! back into the list of *all* runs produced by the expanded pattern:
//!
//! ```text
//! groups:   [VAL] [23*] [XF*] [12345*] [:foo.bar]
//! expanded: [VAL] [_] [23] [_] [XF] [_] [12345] [:foo.bar]
//! result:   [VAL] [_] [23*] [_] [XF*] [_] [12345*] [:foo.bar]
//! ```
//!
//! Positions are found by searching forward only from the previous hit, which
//! keeps duplicate texts aligned left to right. All positions are computed
//! first; the result is then built in a single fold over a fresh list.

use crate::Fragment;

/// Position in `expanded` of each entry of `groups`, searching forward only.
///
/// A group that cannot be placed maps to `None` and does not move the cursor.
pub(crate) fn positions<G, E>(groups: &[G], expanded: &[E]) -> Vec<Option<usize>>
where
    G: AsRef<str>,
    E: AsRef<str>,
{
    let mut cursor = 0;
    groups
        .iter()
        .map(|group| {
            let found =
                expanded.iter().skip(cursor).position(|e| e.as_ref() == group.as_ref()).map(|offset| cursor + offset);
            if let Some(pos) = found {
                cursor = pos + 1;
            }
            found
        })
        .collect()
}

/// Merge processed `groups` into the `expanded` run list.
///
/// `texts` are the plain group texts used for alignment; `groups` holds the
/// (possibly linked) fragments, index for index. Every expanded run that no
/// group maps to stays plain, so separators are kept verbatim.
pub(crate) fn reinsert<S: AsRef<str>>(texts: &[S], groups: &[Fragment], expanded: &[String]) -> Vec<Fragment> {
    let placed = positions(texts, expanded);
    let base: Vec<Fragment> = expanded.iter().map(|e| Fragment::plain(e.as_str())).collect();

    placed.iter().enumerate().fold(base, |mut acc, (group_idx, slot)| {
        if let (Some(slot), Some(fragment)) = (slot, groups.get(group_idx)) {
            tracing::trace!(group_idx, slot, "reinserting group");
            acc[*slot] = fragment.clone();
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reinserts_separators_around_linked_groups() {
        let texts = ["VAL", "23", "XF", "12345", ":foo.bar"];
        let groups = fragments!["VAL", (0, "23"), (1, "XF"), (2, "12345"), ":foo.bar"];
        let expanded = strings(&["VAL", "_", "23", "_", "XF", "_", "12345", ":foo.bar"]);

        let out = reinsert(&texts, &groups, &expanded);
        assert_eq!(out, fragments!["VAL", "_", (0, "23"), "_", (1, "XF"), "_", (2, "12345"), ":foo.bar"]);
        assert_eq!(Fragment::concat(&out), "VAL_23_XF_12345:foo.bar");
    }

    #[test]
    fn duplicate_texts_align_left_to_right() {
        let texts = ["12", "AB", "12"];
        let groups = fragments!["12", "AB", (0, "12")];
        let expanded = strings(&["12", "_", "AB", "_", "12"]);

        let out = reinsert(&texts, &groups, &expanded);
        assert_eq!(out, fragments!["12", "_", "AB", "_", (0, "12")]);
    }

    #[test]
    fn unplaceable_group_is_skipped() {
        assert_eq!(positions(&["A", "Z", "B"], &["A", "-", "B"]), vec![Some(0), None, Some(2)]);
        let out = reinsert(&["A", "Z"], &fragments![(0, "A"), (1, "Z")], &strings(&["A", "-", "B"]));
        assert_eq!(out, fragments![(0, "A"), "-", "B"]);
    }

    #[test]
    fn empty_tail_group_is_found() {
        assert_eq!(positions(&["A", ""], &["A", "_", ""]), vec![Some(0), Some(2)]);
    }

    proptest! {
        #[test]
        fn concatenation_reproduces_expanded(runs in proptest::collection::vec("[a-z]{1,3}|[0-9]{1,3}|[-_:]", 0..10)) {
            let meaningful: Vec<&String> = runs.iter().filter(|r| r.chars().all(char::is_alphanumeric)).collect();
            let linked: Vec<Fragment> =
                meaningful.iter().enumerate().map(|(i, r)| Fragment::linked(i, r.as_str())).collect();

            let colored = reinsert(&meaningful, &linked, &runs);
            let plain = reinsert(&meaningful, &[], &runs);

            prop_assert_eq!(Fragment::concat(&colored), runs.concat());
            prop_assert_eq!(Fragment::concat(&plain), runs.concat());
        }
    }
}
