use crate::options::QueryOptions;
use crate::tests::test_data::{bag, pairs, random_tag_index, small_sbr, small_sbr_with_sink};

#[test]
fn test_recommend_by_profile_top_two() {
    let sbr = small_sbr();
    let opts = QueryOptions::default().with_normalize(false);
    let recs = sbr.recommend_by_profile(&bag(&[("A", 1.0), ("B", 1.0)]), 2, &opts);
    assert_eq!(recs.into_vec(), pairs(&[("i3", 4.0), ("i2", 3.0)]));
}

#[test]
fn test_recommend_by_profile_normalized() {
    let sbr = small_sbr();
    let recs = sbr.recommend_by_profile(&bag(&[("A", 1.0), ("B", 1.0)]), 3, &QueryOptions::default());
    assert_eq!(
        recs.into_vec(),
        pairs(&[("i3", 1.0), ("i2", 0.75), ("i1", 0.25)])
    );
}

#[test]
fn test_recommend_by_profile_weighted() {
    let sbr = small_sbr();
    let opts = QueryOptions::default().with_normalize(false);
    let recs = sbr.recommend_by_profile(&bag(&[("A", 2.0), ("C", -2.0)]), 10, &opts);
    // i1 = 2 - 1, i2 = 4, i3 = -1
    assert_eq!(
        recs.into_vec(),
        pairs(&[("i2", 4.0), ("i1", 1.0), ("i3", -1.0)])
    );
}

#[test]
fn test_recommend_by_tags_matches_unit_profile() {
    let sbr = small_sbr();
    let opts = QueryOptions::default();
    assert_eq!(
        sbr.recommend_by_tags(&["A", "C"], 3, &opts),
        sbr.recommend_by_profile(&bag(&[("A", 1.0), ("C", 1.0)]), 3, &opts)
    );
}

#[test]
fn test_recommend_k_zero() {
    let sbr = small_sbr();
    assert!(sbr
        .recommend_by_tags(&["A"], 0, &QueryOptions::default())
        .is_empty());
}

#[test]
fn test_recommend_unknown_tag() {
    let (sbr, sink) = small_sbr_with_sink();
    let opts = QueryOptions::default().with_warn(true);
    assert!(sbr.recommend_by_tags(&["A", "Z"], 3, &opts).is_empty());
    assert_eq!(sink.messages(), vec!["The tag Z is unknown."]);

    let recs = sbr.recommend_by_tags(&["A", "Z"], 3, &opts.with_ignore_unknown(true));
    assert_eq!(recs, sbr.recommend_by_tags(&["A"], 3, &opts));
}

#[test]
fn test_recommend_by_history() {
    let sbr = small_sbr();
    // profile of i1: A = 1, C = 0.5
    // i1 = 1 + 0.25, i2 = 2, i3 = 0.25
    let opts = QueryOptions::default().with_normalize(false);
    let recs = sbr.recommend(&bag(&[("i1", 1.0)]), 3, &opts);
    assert_eq!(
        recs.into_vec(),
        pairs(&[("i2", 2.0), ("i1", 1.25), ("i3", 0.25)])
    );

    let recs = sbr.recommend(&bag(&[("i1", 1.0)]), 2, &QueryOptions::default());
    assert_eq!(recs.into_vec(), pairs(&[("i2", 1.0), ("i1", 0.625)]));
}

#[test]
fn test_recommend_profile_not_normalized_in_between() {
    let sbr = small_sbr();
    let opts = QueryOptions::default();
    let input = bag(&[("i1", 1.0), ("i3", 2.0)]);
    let raw_profile = sbr.profile(&input, &opts.with_normalize(false));
    assert_eq!(
        sbr.recommend(&input, 3, &opts),
        sbr.recommend_by_profile(&raw_profile.to_bag(), 3, &opts)
    );
}

#[test]
fn test_recommend_unknown_item() {
    let (sbr, sink) = small_sbr_with_sink();
    let opts = QueryOptions::default().with_warn(true);
    assert!(sbr.recommend(&bag(&[("ghost", 1.0)]), 3, &opts).is_empty());
    assert_eq!(sink.messages(), vec!["The item ghost is unknown."]);
}

#[test]
fn test_top_k_is_prefix_of_unbounded() {
    let index = random_tag_index(17, 12, 400, 3000);
    let sbr = crate::builder::CoreSbrBuilder::new().build_from_index(index);
    let opts = QueryOptions::default();
    let profile = bag(&[("t0", 1.0), ("t3", 0.5), ("t7", 2.0), ("t11", -0.25)]);

    let full = sbr.recommend_by_profile(&profile, usize::MAX, &opts).into_vec();
    assert!(full.windows(2).all(|w| w[0].1 > w[1].1 || (w[0].1 == w[1].1 && w[0].0 < w[1].0)));
    for k in [1, 5, 10, 50, 400, 1000] {
        let top = sbr.recommend_by_profile(&profile, k, &opts).into_vec();
        assert!(top.len() <= k);
        assert_eq!(top[..], full[..top.len()]);
    }
}

#[test]
fn test_batch_matches_single_queries() {
    let index = random_tag_index(29, 20, 300, 2500);
    let sbr = crate::builder::CoreSbrBuilder::new().build_from_index(index);
    let opts = QueryOptions::default().with_ignore_unknown(true);
    let profiles: Vec<_> = (0..16)
        .map(|i| bag(&[(format!("t{}", i).as_str(), 1.0), ("t19", 0.5)]))
        .collect();

    let batch = sbr.recommend_by_profiles(&profiles, 7, &opts);
    assert_eq!(batch.len(), profiles.len());
    for (p, res) in profiles.iter().zip(batch) {
        assert_eq!(res, sbr.recommend_by_profile(p, 7, &opts));
    }
}
