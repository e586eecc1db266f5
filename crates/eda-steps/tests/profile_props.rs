use eda_core::{ArtifactSink, ExecutionContext, MetricValue, StepExecution};
use eda_domain::{Column, Dataset};
use eda_steps::steps::ProfileStep;
use proptest::prelude::*;

fn numeric_column() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::of(-1.0e6..1.0e6f64), 0..40)
}

proptest! {
    #[test]
    fn profile_missing_counts_match_manual_scan(values in numeric_column()) {
        let labels: Vec<Option<String>> = values.iter()
                                                .map(|v| v.map(|x| if x > 0.0 { "pos".to_string() } else { "neg".to_string() }))
                                                .collect();
        let ds = Dataset::new(vec![Column::numerical("x", values.clone()),
                                   Column::categorical("sign", labels)]).unwrap();
        let ctx = ExecutionContext::new(&ds, None, std::path::Path::new("out"));
        let mut sink = ArtifactSink::new("profile");
        let exec = ProfileStep::default().execute(&ctx, &mut sink).unwrap();
        prop_assert!(matches!(exec, StepExecution::Completed { .. }), "expected StepExecution::Completed");

        let manual = values.iter().filter(|v| v.is_none()).count();
        for name in ["profile.x.summary", "profile.sign.summary"] {
            let table = sink.staged().iter().find(|a| a.name == name).and_then(|a| a.as_stats()).unwrap();
            prop_assert_eq!(table.get("missing").cloned(), Some(MetricValue::Count(manual as u64)));
            prop_assert_eq!(table.get("count").cloned(), Some(MetricValue::Count((values.len() - manual) as u64)));
        }
        let overview = sink.staged().iter().find(|a| a.name == "profile.dataset.overview").and_then(|a| a.as_stats()).unwrap();
        prop_assert_eq!(overview.get("missing_cells").cloned(), Some(MetricValue::Count(2 * manual as u64)));
    }
}
