//! Set difference between two track collections by id.

use std::collections::HashSet;

use crate::spotify::Track;

/// Tracks from `source` whose id is absent from `destination`, in the
/// original source order. Pure; O(n+m) time, O(m) auxiliary space.
///
/// `skipped = source.len() - result.len()`.
pub fn unique_against(source: &[Track], destination: &[Track]) -> Vec<Track> {
    let existing: HashSet<&str> = destination.iter().map(|t| t.id.as_str()).collect();
    source
        .iter()
        .filter(|t| !existing.contains(t.id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            name: format!("track {id}"),
            artists: vec!["Artist".into()],
            album: "Album".into(),
            image_url: None,
            duration_ms: 180_000,
        }
    }

    #[test]
    fn filters_tracks_already_in_destination() {
        let source = vec![track("a"), track("b"), track("c")];
        let destination = vec![track("b")];

        let unique = unique_against(&source, &destination);
        let skipped = source.len() - unique.len();

        assert_eq!(
            unique.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
        assert_eq!(skipped, 1);
    }

    #[test]
    fn empty_destination_keeps_everything() {
        let source = vec![track("a"), track("b")];
        assert_eq!(unique_against(&source, &[]), source);
    }

    #[test]
    fn identical_collections_keep_nothing() {
        let source = vec![track("a"), track("b")];
        assert!(unique_against(&source, &source).is_empty());
    }

    proptest! {
        #[test]
        fn result_order_and_accounting_hold(
            source_ids in proptest::collection::vec("[a-z]{1,4}", 0..40),
            dest_ids in proptest::collection::vec("[a-z]{1,4}", 0..40),
        ) {
            let source: Vec<Track> = source_ids.iter().map(|id| track(id)).collect();
            let destination: Vec<Track> = dest_ids.iter().map(|id| track(id)).collect();

            let unique = unique_against(&source, &destination);
            let skipped = source.len() - unique.len();

            // No id present in the destination survives.
            let dest_set: std::collections::HashSet<&str> =
                dest_ids.iter().map(String::as_str).collect();
            prop_assert!(unique.iter().all(|t| !dest_set.contains(t.id.as_str())));

            // The result is a subsequence of the source (order preserved).
            let mut source_iter = source.iter();
            for kept in &unique {
                prop_assert!(source_iter.any(|s| s.id == kept.id));
            }

            prop_assert_eq!(unique.len() + skipped, source.len());
        }
    }
}
