use formstate::graph::DependencyGraph;
use formstate::{
    Computed, ConfigError, FieldDescriptor, FieldValue, FormConfig, FormController, FormDescriptor,
    ValueMap,
};
use proptest::prelude::*;
use std::collections::HashMap;

/// Base field count and, per computed field, raw source picks. Each pick is
/// reduced to an earlier field, so the layout is always acyclic.
fn arb_layout() -> impl Strategy<Value = (usize, Vec<Vec<usize>>)> {
    (
        1usize..4,
        prop::collection::vec(prop::collection::vec(0usize..64, 1..4), 0..8),
    )
}

struct Layout {
    bases: Vec<String>,
    computed: Vec<(String, Vec<String>)>,
}

fn resolve(bases: usize, picks: &[Vec<usize>]) -> Layout {
    let base_names: Vec<String> = (0..bases).map(|i| format!("b{i}")).collect();
    let mut all = base_names.clone();
    let mut computed = Vec::new();
    for (i, raw) in picks.iter().enumerate() {
        let sources: Vec<String> = raw.iter().map(|r| all[r % all.len()].clone()).collect();
        let name = format!("c{i}");
        computed.push((name.clone(), sources));
        all.push(name);
    }
    Layout {
        bases: base_names,
        computed,
    }
}

fn number(values: &ValueMap, name: &str) -> f64 {
    values.get(name).and_then(FieldValue::as_number).unwrap_or(0.0)
}

fn sum_of(sources: &[String]) -> Computed {
    let reads = sources.to_vec();
    Computed::new(sources.iter().cloned(), move |values| {
        FieldValue::Number(reads.iter().map(|s| number(values, s)).sum())
    })
}

fn descriptor(layout: &Layout) -> FormDescriptor {
    let mut fields: Vec<FieldDescriptor> =
        layout.bases.iter().map(FieldDescriptor::number).collect();
    for (name, sources) in &layout.computed {
        fields.push(FieldDescriptor::number(name).computed(sum_of(sources)));
    }
    FormDescriptor::with_fields(fields)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn acyclic_layouts_order_sources_first((bases, picks) in arb_layout()) {
        let layout = resolve(bases, &picks);
        let form = descriptor(&layout);
        let graph = DependencyGraph::build(&form.fields()).expect("acyclic layout");

        prop_assert_eq!(graph.order().len(), layout.computed.len());
        let position: HashMap<&str, usize> = graph
            .order()
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        for (name, sources) in &layout.computed {
            for source in sources {
                if let Some(before) = position.get(source.as_str()) {
                    prop_assert!(*before < position[name.as_str()],
                        "{} evaluated after its dependent {}", source, name);
                }
            }
        }
    }

    #[test]
    fn propagation_matches_direct_evaluation(
        (bases, picks) in arb_layout(),
        inputs in prop::collection::vec(0u8..100, 4),
    ) {
        let layout = resolve(bases, &picks);
        let mut form = FormController::new(descriptor(&layout), FormConfig::default())
            .expect("acyclic layout");

        let mut expected = ValueMap::new();
        for (name, input) in layout.bases.iter().zip(&inputs) {
            form.set(name, f64::from(*input)).expect("number field");
            expected.insert(name.clone(), FieldValue::Number(f64::from(*input)));
        }
        // Declaration order is a valid evaluation order here.
        for (name, sources) in &layout.computed {
            let total = sources.iter().map(|s| number(&expected, s)).sum();
            expected.insert(name.clone(), FieldValue::Number(total));
        }

        for (name, value) in &expected {
            prop_assert_eq!(form.get(name), Some(value), "field {}", name);
        }
    }

    #[test]
    fn rings_are_always_rejected(len in 1usize..6) {
        let names: Vec<String> = (0..len).map(|i| format!("r{i}")).collect();
        let mut fields = vec![FieldDescriptor::number("seed")];
        for (i, name) in names.iter().enumerate() {
            let next = &names[(i + 1) % len];
            fields.push(
                FieldDescriptor::number(name)
                    .computed(sum_of(&[next.clone(), "seed".to_string()])),
            );
        }
        let form = FormDescriptor::with_fields(fields);

        let errors = DependencyGraph::build(&form.fields()).expect_err("ring must be rejected");
        prop_assert_eq!(errors.len(), 1);
        let ConfigError::DependencyCycle { path } = &errors[0] else {
            return Err(TestCaseError::fail(format!("expected a cycle, got {:?}", errors)));
        };
        prop_assert_eq!(path.len(), len + 1);
        prop_assert_eq!(path.first(), path.last());
        // Each step goes from a source to the field reading it.
        for pair in path.windows(2) {
            let i = names.iter().position(|n| *n == pair[1]).expect("ring member");
            prop_assert_eq!(&pair[0], &names[(i + 1) % len]);
        }
    }
}
