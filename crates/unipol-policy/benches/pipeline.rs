use std::collections::BTreeSet;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use unipol_core::{LogDoc, Pipeline};
use unipol_policy::UniversalPreProcessor;

const MESSAGES: &[(&str, &str)] = &[
    ("consensus::finalizer", "Finalized height {} with hash 0a1b2c"),
    ("orchestrator", "Rebooting node for upgrade"),
    ("systemd", "Started IC replica"),
    ("http_handler", "Served request {}"),
];

fn make_docs(count: usize) -> Vec<LogDoc> {
    (0..count)
        .map(|i| {
            let (component, template) = MESSAGES[i % MESSAGES.len()];
            LogDoc::new(1_700_000_000_000 + i as i64, format!("node-{}", i % 13))
                .with_subnet("nns")
                .with_component(component)
                .with_message(template.replace("{}", &i.to_string()))
                .with_field("replica_version", "0.9.0")
        })
        .collect()
}

fn bench_policies_without_infra(c: &mut Criterion) {
    let docs = make_docs(4096);
    let policies: BTreeSet<String> = UniversalPreProcessor::supported_policies_without_infra()
        .into_iter()
        .collect();

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(docs.len() as u64));
    group.bench_function("policies_without_infra", |b| {
        let mut pipeline =
            Pipeline::new(UniversalPreProcessor::new(None, Some(policies.clone())).unwrap());
        b.iter(|| pipeline.run(docs.iter().cloned()).filter(Result::is_ok).count());
    });
    group.finish();
}

criterion_group!(benches, bench_policies_without_infra);
criterion_main!(benches);
