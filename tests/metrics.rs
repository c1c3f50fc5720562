#![cfg(feature = "metrics")]

use anyhow::Result;
use rankflow::metrics::{GaugeMetric, MetricsCollector};
use rankflow::*;
use serde_json::{Value, json};

#[test]
fn runner_records_counters() -> Result<()> {
    let p = Pipeline::default();
    p.set_metrics(MetricsCollector::new());

    let rows: Vec<(u8, u32)> = (0..100u32).map(|i| ((i % 5) as u8, i)).collect();
    let out = from_vec(&p, rows)
        .percentiles_in_memory(&[0.5])?
        .collect_par(None, Some(4))?;
    assert_eq!(out.len(), 5);

    let m = p.take_metrics().expect("metrics attached");
    assert_eq!(m.counter("elements_out"), Some(5));
    assert_eq!(m.counter("barriers_executed"), Some(1));
    assert_eq!(m.counter("stages_executed"), Some(2));
    assert_eq!(m.counter("partitions"), Some(4));
    assert!(m.elapsed().is_some());
    Ok(())
}

#[test]
fn counters_accumulate_over_runs() -> Result<()> {
    let p = Pipeline::default();
    let metrics = MetricsCollector::new();
    p.set_metrics(metrics.clone());

    let words = from_vec(&p, "abcab".chars().collect::<Vec<_>>()).count_per_element();
    words.clone().collect_seq()?;
    words.collect_seq()?;

    assert_eq!(metrics.counter("elements_out"), Some(6));
    assert_eq!(metrics.counter("partitions"), Some(1));
    Ok(())
}

#[test]
fn save_to_file_writes_json() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("metrics.json");

    let p = Pipeline::default();
    let m = MetricsCollector::new();
    m.register(Box::new(GaugeMetric::new("skew", 1.5).with_description("max / mean partition size")));
    p.set_metrics(m.clone());
    from_vec(&p, vec![1u32, 2, 3]).map(|x: &u32| x + 1).collect_seq()?;

    m.save_to_file(&path)?;
    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(saved["skew"]["value"], json!(1.5));
    assert_eq!(saved["elements_out"]["value"], json!(3));
    assert!(saved.get("execution_time_ms").is_some());
    Ok(())
}
