use anyhow::Result;
use rankflow::*;
use std::cmp::Reverse;

#[test]
fn par_equals_seq_after_sort() -> Result<()> {
    let p = Pipeline::default();
    let col = from_vec(&p, (0..10_000).map(|i| format!("w{}", i % 257)).collect::<Vec<_>>())
        .flat_map(|w: &String| vec![w.clone(), w.clone()]);
    let seq = col.clone().collect_seq_sorted()?;
    let par = col.collect_par_sorted(Some(8), None)?;
    assert_eq!(seq, par);
    Ok(())
}

#[test]
fn sort_and_apply_merges_runs_from_every_partition() -> Result<()> {
    let p = Pipeline::default();
    let rows: Vec<(u8, (u32, u32))> = (0..3_000u32)
        .map(|i| ((i % 4) as u8, ((i * 31) % 1_000, i)))
        .collect();
    let sorted_groups = from_vec(&p, rows).sort_and_apply(|_k, group: SortedGroup<u32, u32>| {
        group.map(|(s, _)| s).collect::<Vec<u32>>()
    });

    for out in [
        sorted_groups.clone().collect_seq()?,
        sorted_groups.collect_par(Some(3), Some(7))?,
    ] {
        assert_eq!(out.len(), 4);
        for (_, keys) in out {
            assert_eq!(keys.len(), 750);
            assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        }
    }
    Ok(())
}

#[test]
fn sort_and_apply_is_stable_for_equal_keys() -> Result<()> {
    let p = Pipeline::default();
    let rows = vec![
        ('k', (1u8, "first".to_string())),
        ('k', (0, "zero".to_string())),
        ('k', (1, "second".to_string())),
        ('k', (1, "third".to_string())),
    ];
    let out = from_vec(&p, rows)
        .sort_and_apply(|_k, group| group.map(|(_, v)| v).collect::<Vec<String>>())
        .collect_seq()?;
    assert_eq!(out, vec![('k', vec!["zero".to_string(), "first".into(), "second".into(), "third".into()])]);
    Ok(())
}

#[test]
fn sort_and_apply_exposes_group_size() -> Result<()> {
    let p = Pipeline::default();
    let rows: Vec<(u8, (u16, ()))> = (0..100u16).map(|i| ((i % 2) as u8, (i, ()))).collect();
    let out = from_vec(&p, rows)
        .sort_and_apply(|_k, group| group.len())
        .collect_par_sorted_by_key(None, Some(5))?;
    assert_eq!(out, vec![(0, 50), (1, 50)]);
    Ok(())
}

#[test]
fn global_sort_is_total() -> Result<()> {
    let p = Pipeline::default();
    let data: Vec<u32> = (0..5_000u32).map(|i| (i * 7_919) % 4_999).collect();
    let col = from_vec(&p, data).sort_globally_by_key(|x: &u32| Reverse(*x));

    let mut expected: Vec<u32> = (0..5_000u32).map(|i| (i * 7_919) % 4_999).collect();
    expected.sort_by_key(|x| Reverse(*x));
    assert_eq!(col.clone().collect_seq()?, expected);
    assert_eq!(col.collect_par(Some(4), Some(9))?, expected);
    Ok(())
}

#[test]
fn stateless_after_global_sort_keeps_order() -> Result<()> {
    let p = Pipeline::default();
    let out = from_vec(&p, vec![5i32, -3, 9, 0])
        .sort_globally_by_key(|x: &i32| *x)
        .map(|x: &i32| x * 2)
        .collect_par(None, Some(3))?;
    assert_eq!(out, vec![-6, 0, 10, 18]);
    Ok(())
}

#[test]
fn reruns_reproduce_row_order() -> Result<()> {
    let p = Pipeline::default();
    let rows: Vec<(String, u32)> = (0..4_000u32).map(|i| (format!("k{}", i % 53), i % 17)).collect();
    let col = from_vec(&p, rows).group_by_key().map(|(k, vs): &(String, Vec<u32>)| (k.clone(), vs.len()));

    let a = col.clone().collect_par(None, Some(6))?;
    let b = col.clone().collect_par(None, Some(6))?;
    assert_eq!(a, b);

    let c = col.clone().collect_seq()?;
    let d = col.collect_seq()?;
    assert_eq!(c, d);
    Ok(())
}
