use anyhow::Result;
use rankflow::*;

#[test]
fn explicit_runner_modes_agree() -> Result<()> {
    let p = Pipeline::default();
    let rows: Vec<(u32, u32)> = (0..50_000u32).map(|i| (i % 101, i % 13)).collect();
    let top = from_vec(&p, rows).top_n_by_key(3);

    let seq = Runner {
        mode: ExecMode::Sequential,
        ..Default::default()
    }
    .run_collect::<(u32, Vec<(u64, u32)>)>(&p, top.id())?;

    let par = Runner {
        mode: ExecMode::Parallel {
            threads: Some(3),
            partitions: None,
        },
        default_partitions: 4,
    }
    .run_collect::<(u32, Vec<(u64, u32)>)>(&p, top.id())?;

    let mut seq_counts: Vec<(u32, Vec<u64>)> = seq
        .into_iter()
        .map(|(k, l)| (k, l.into_iter().map(|(c, _)| c).collect()))
        .collect();
    let mut par_counts: Vec<(u32, Vec<u64>)> = par
        .into_iter()
        .map(|(k, l)| (k, l.into_iter().map(|(c, _)| c).collect()))
        .collect();
    seq_counts.sort();
    par_counts.sort();
    assert_eq!(seq_counts.len(), 101);
    assert_eq!(seq_counts, par_counts);
    Ok(())
}

#[test]
fn single_partition_parallel_run() -> Result<()> {
    let p = Pipeline::default();
    let out = from_vec(&p, vec![3u8, 1, 2])
        .global_toplist()
        .collect_par(Some(1), Some(1))?;
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|(_, c)| *c == 1));
    Ok(())
}

#[test]
fn wrong_terminal_type_is_an_error() {
    let p = Pipeline::default();
    let c = from_vec(&p, vec![(1u32, 2u32)]).mean_per_key();
    let err = Runner::default().run_collect::<u8>(&p, c.id()).unwrap_err();
    assert!(err.to_string().contains("terminal type mismatch"));
}
