use anyhow::Result;
use rankflow::*;

fn sorted<T: Ord>(mut v: Vec<T>) -> Vec<T> {
    v.sort();
    v
}

#[test]
fn inner_join_basic_seq_par() -> Result<()> {
    let p = Pipeline::default();
    let left = from_vec(
        &p,
        vec![
            ("a".to_string(), 1u32),
            ("b".to_string(), 2),
            ("a".to_string(), 3),
        ],
    );
    let right = from_vec(
        &p,
        vec![
            ("a".to_string(), 10i32),
            ("c".to_string(), 30),
            ("a".to_string(), 40),
            ("b".to_string(), 20),
        ],
    );

    let joined = left.join_inner(&right);
    let seq = sorted(joined.clone().collect_seq()?);
    let par = sorted(joined.collect_par(None, Some(3))?);

    let expected = sorted(vec![
        ("a".to_string(), (1u32, 10i32)),
        ("a".to_string(), (1u32, 40i32)),
        ("a".to_string(), (3u32, 10i32)),
        ("a".to_string(), (3u32, 40i32)),
        ("b".to_string(), (2u32, 20i32)),
    ]);
    assert_eq!(seq, expected);
    assert_eq!(par, expected);
    Ok(())
}

#[test]
fn join_with_no_matching_keys_is_empty() -> Result<()> {
    let p = Pipeline::default();
    let left = from_vec(&p, vec![(1u32, 'a'), (2, 'b')]);
    let right = from_vec(&p, vec![(3u32, "x".to_string())]);
    assert!(left.join_inner(&right).collect_par(None, None)?.is_empty());
    Ok(())
}

#[test]
fn join_sides_run_their_own_shuffles() -> Result<()> {
    let p = Pipeline::default();
    let rows = from_vec(
        &p,
        vec![(1u8, 5u32), (1, 7), (2, 1), (1, 5), (3, 0)],
    );
    let counts = rows.clone().keys().count_per_element();
    let joined = counts.join_inner(&rows.filter(|(_, v): &(u8, u32)| *v > 0));

    let expected = vec![(1u8, (3u64, 5u32)), (1, (3, 5)), (1, (3, 7)), (2, (1, 1))];
    assert_eq!(sorted(joined.clone().collect_seq()?), expected);
    assert_eq!(sorted(joined.collect_par(Some(2), Some(4))?), expected);
    Ok(())
}

#[test]
fn join_of_a_join() -> Result<()> {
    let p = Pipeline::default();
    let a = from_vec(&p, vec![(1u8, 'x'), (2, 'y')]);
    let b = from_vec(&p, vec![(1u8, 10u16), (2, 20)]);
    let c = from_vec(&p, vec![(2u8, true)]);

    let abc = a.join_inner(&b).join_inner(&c);
    assert_eq!(abc.clone().collect_seq()?, vec![(2u8, (('y', 20u16), true))]);
    assert_eq!(abc.collect_par(None, Some(2))?, vec![(2u8, (('y', 20u16), true))]);
    Ok(())
}
