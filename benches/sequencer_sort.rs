use criterion::{criterion_group, criterion_main, Criterion};
use kairos::replay::sequencer::Sequencer;
use kairos::store::TripleStore;
use oxigraph::io::RdfFormat;

const MADE_BY: &str = "https://saref.etsi.org/core/measurementMadeBy";
const HAS_TIMESTAMP: &str = "https://saref.etsi.org/core/hasTimestamp";

/// Build a store with `count` observations whose timestamps are deliberately
/// out of discovery order.
fn build_store(count: usize) -> (TripleStore, Vec<String>) {
    let mut doc = String::new();
    let mut subjects = Vec::with_capacity(count);
    for i in 0..count {
        let subject = format!("http://example.org/obs/{}", i);
        // Deterministic shuffle of the timestamp offsets.
        let offset = (i * 7919) % count;
        doc.push_str(&format!(
            "<{}> <{}> <http://example.org/sensor/1> .\n",
            subject, MADE_BY
        ));
        doc.push_str(&format!(
            "<{}> <{}> \"2023-05-08T{:02}:{:02}:{:02}Z\" .\n",
            subject,
            HAS_TIMESTAMP,
            offset / 3600,
            (offset / 60) % 60,
            offset % 60
        ));
        subjects.push(subject);
    }
    let store = TripleStore::new().expect("store");
    store.load_reader(RdfFormat::NTriples, doc.as_bytes()).expect("load");
    (store, subjects)
}

fn bench_sequencer_sort(c: &mut Criterion) {
    let (store, subjects) = build_store(1000);

    c.bench_function("sequencer_sort_1000", |b| {
        b.iter(|| {
            let sequencer = Sequencer::new(&store, HAS_TIMESTAMP);
            sequencer.sequence(subjects.clone()).expect("sequence")
        });
    });
}

criterion_group!(benches, bench_sequencer_sort);
criterion_main!(benches);
