use anyhow::Result;
use rankflow::planner::{OptimizationDecision, build_plan};
use rankflow::*;

#[test]
fn group_then_lifted_combine_plans_one_barrier() -> Result<()> {
    let p = Pipeline::default();
    let means = from_vec(&p, vec![("a".to_string(), 1u32), ("a".to_string(), 3)])
        .group_by_key()
        .combine_values_lifted(Count);

    let explanation = means.explain()?;
    assert_eq!(explanation.barriers, 1);
    assert!(explanation.optimizations.contains(&OptimizationDecision::LiftedGBKCombine));
    assert_eq!(means.collect_seq()?, vec![("a".to_string(), 2)]);
    Ok(())
}

#[test]
fn lifted_combine_without_preceding_group_uses_groups() -> Result<()> {
    let p = Pipeline::default();
    let grouped = from_vec(&p, vec![(1u8, vec![2u32, 4]), (2, vec![9]), (1, vec![6])]);
    let explanation = grouped.clone().combine_values_lifted(Mean).explain()?;
    assert!(!explanation.optimizations.contains(&OptimizationDecision::LiftedGBKCombine));

    let mut out = grouped.combine_values_lifted(Mean).collect_par(None, Some(2))?;
    out.sort_by_key(|(k, _)| *k);
    assert_eq!(out, vec![(1, 4.0), (2, 9.0)]);
    Ok(())
}

#[test]
fn distributed_percentiles_plan_shape() -> Result<()> {
    let p = Pipeline::default();
    let t = from_vec(&p, vec![(1u8, 3u32), (1, 4)]);
    let plan = build_plan(&p, t.percentiles_distributed(&[0.5])?.id())?;
    let kinds: Vec<&str> = plan.chain.iter().map(|n| n.kind()).collect();
    assert_eq!(kinds, vec!["Source", "CoGroup", "Stateless", "SortGroups", "Stateless"]);
    Ok(())
}

#[test]
fn explain_lists_every_step() -> Result<()> {
    let p = Pipeline::default();
    let top = from_vec(&p, vec![('a', 'x'), ('a', 'y')]).top_n_by_key(1);
    let text = top.explain()?.to_string();
    assert!(text.contains("CombineValues [BARRIER]"));
    assert!(text.contains("SortGroups [BARRIER]"));
    assert!(text.contains("apply_sorted"));
    assert!(text.contains("source size: 2"));
    Ok(())
}

#[test]
fn partition_suggestion_is_recorded() -> Result<()> {
    let p = Pipeline::default();
    let c = from_vec(&p, (0..10u32).collect::<Vec<_>>());
    let explanation = c.explain()?;
    assert!(explanation.optimizations.iter().any(|o| matches!(
        o,
        OptimizationDecision::PartitionSuggestion {
            source_len: Some(10),
            ..
        }
    )));
    Ok(())
}
