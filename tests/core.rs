use anyhow::Result;
use rankflow::testing::*;
use rankflow::*;

fn kv(pairs: &[(&str, u32)]) -> Vec<(String, u32)> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

#[test]
fn stateless_chain_seq_par() -> Result<()> {
    let p = Pipeline::default();
    let col = from_iter(&p, 0..2_000u32)
        .filter(|x: &u32| x % 3 == 0)
        .flat_map(|x: &u32| vec![*x, x + 1])
        .map(|x: &u32| u64::from(*x) * 2);

    let seq = col.clone().collect_seq()?;
    let par = col.collect_par(Some(4), Some(6))?;
    assert_collections_equal(&seq, &par);
    assert_eq!(seq.len(), 2 * 667);
    assert_eq!(&seq[..4], &[0, 2, 6, 8]);
    Ok(())
}

#[test]
fn projections_and_swaps() -> Result<()> {
    let p = Pipeline::default();
    let t = from_vec(&p, kv(&[("a", 1), ("b", 2), ("a", 3)]));

    assert_eq!(t.clone().keys().collect_seq()?, vec!["a", "b", "a"]);
    assert_eq!(t.clone().values().collect_seq()?, vec![1, 2, 3]);
    assert_eq!(
        t.clone().swap_kv().collect_seq()?,
        vec![(1, "a".to_string()), (2, "b".to_string()), (3, "a".to_string())]
    );
    assert_eq!(
        t.map_values(|v: &u32| v * 10).collect_seq()?,
        kv(&[("a", 10), ("b", 20), ("a", 30)])
    );
    Ok(())
}

#[test]
fn negate_counts_orders_descending() -> Result<()> {
    let p = Pipeline::default();
    let counts = from_vec(&p, vec![('x', 1u64), ('y', 7), ('z', u64::MAX)]);
    let mut neg = counts.negate_counts().collect_seq()?;
    neg.sort_by_key(|(_, c)| *c);
    assert_eq!(neg, vec![('z', i64::MIN + 1), ('y', -7), ('x', -1)]);
    Ok(())
}

#[test]
fn group_by_key_keeps_duplicates() -> Result<()> {
    let p = Pipeline::default();
    let t = from_vec(&p, kv(&[("a", 1), ("b", 2), ("a", 1), ("a", 3)]));
    let grouped = t.group_by_key();

    let normalize = |rows: Vec<(String, Vec<u32>)>| {
        let mut rows: Vec<_> = rows
            .into_iter()
            .map(|(k, mut vs)| {
                vs.sort_unstable();
                (k, vs)
            })
            .collect();
        rows.sort();
        rows
    };
    let expected = vec![("a".to_string(), vec![1, 1, 3]), ("b".to_string(), vec![2])];
    assert_eq!(normalize(grouped.clone().collect_seq()?), expected);
    assert_eq!(normalize(grouped.collect_par(None, Some(3))?), expected);
    Ok(())
}

#[test]
fn count_per_element_and_keys() -> Result<()> {
    let p = Pipeline::default();
    let t = from_vec(&p, kv(&[("a", 1), ("b", 2), ("a", 1), ("c", 0), ("a", 9)]));

    let key_counts = t.clone().keys().count_per_element().collect_par(None, Some(2))?;
    assert_kv_collections_equal(
        key_counts,
        vec![("a".to_string(), 3), ("b".to_string(), 1), ("c".to_string(), 1)],
    );

    let row_counts = t.count_per_element().collect_seq()?;
    assert_collections_unordered_equal(
        &row_counts,
        &[
            (("a".to_string(), 1), 2),
            (("a".to_string(), 9), 1),
            (("b".to_string(), 2), 1),
            (("c".to_string(), 0), 1),
        ],
    );
    Ok(())
}

#[test]
fn combine_with_custom_combiner() -> Result<()> {
    struct MaxLen;
    impl CombineFn<String, usize, usize> for MaxLen {
        fn create(&self) -> usize {
            0
        }
        fn add_input(&self, acc: &mut usize, v: String) {
            *acc = (*acc).max(v.len());
        }
        fn merge(&self, acc: &mut usize, other: usize) {
            *acc = (*acc).max(other);
        }
        fn finish(&self, acc: usize) -> usize {
            acc
        }
    }

    let p = Pipeline::default();
    let words = from_vec(
        &p,
        vec![(1u8, "ab".to_string()), (2, "x".to_string()), (1, "abcd".to_string())],
    );
    let out = words.combine_values(MaxLen).collect_par(None, Some(3))?;
    assert_kv_collections_equal(out, vec![(1, 4), (2, 1)]);
    Ok(())
}

#[test]
fn empty_source_yields_nothing() -> Result<()> {
    let p = Pipeline::default();
    let t = from_vec(&p, Vec::<(String, u32)>::new());
    assert!(t.clone().group_by_key().collect_par(None, None)?.is_empty());
    assert!(t.clone().mean_per_key().collect_seq()?.is_empty());
    assert!(t.percentiles_in_memory(&[0.5])?.collect_seq()?.is_empty());
    Ok(())
}
