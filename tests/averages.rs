use anyhow::Result;
use rankflow::testing::assert_means_close;
use rankflow::*;

fn table() -> Vec<(String, u32)> {
    [("a", 2), ("b", 3), ("a", 10), ("c", 3), ("c", 4), ("c", 5)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn expected() -> Vec<(String, f64)> {
    vec![("a".to_string(), 6.0), ("b".to_string(), 3.0), ("c".to_string(), 4.0)]
}

#[test]
fn mean_per_key_seq_par() -> Result<()> {
    let p = Pipeline::default();
    let means = from_vec(&p, table()).mean_per_key();

    assert_means_close(means.clone().collect_seq()?, expected(), 1e-12);
    assert_means_close(means.collect_par(Some(3), Some(5))?, expected(), 1e-12);
    Ok(())
}

#[test]
fn lifted_mean_matches_pre_aggregated() -> Result<()> {
    let p = Pipeline::default();
    let lifted = from_vec(&p, table()).group_by_key().combine_values_lifted(Mean);
    assert_means_close(lifted.collect_par(None, Some(4))?, expected(), 1e-12);
    Ok(())
}

#[test]
fn float_values_and_nan_propagate() -> Result<()> {
    let p = Pipeline::default();
    let t = from_vec(
        &p,
        vec![
            (1u8, 0.5f64),
            (1, 1.5),
            (2, f64::NAN),
            (2, 1.0),
            (3, f64::INFINITY),
            (3, 1.0),
        ],
    );
    let out = t.mean_per_key().collect_seq()?;
    assert_means_close(out, vec![(1, 1.0), (2, f64::NAN), (3, f64::INFINITY)], 0.0);
    Ok(())
}

#[test]
fn ord_f64_values_average() -> Result<()> {
    let p = Pipeline::default();
    let t = from_vec(&p, vec![("k".to_string(), OrdF64(1.0)), ("k".to_string(), OrdF64(4.0))]);
    assert_means_close(t.mean_per_key().collect_seq()?, vec![("k".to_string(), 2.5)], 0.0);
    Ok(())
}
