use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jobad_units::feature_units::convert;
use jobad_units::{FeatureUnitPipeline, FusConfig, StopwordSet};

const SHORT_TEXT: &str = "Java Entwickler (m/w/d) gesucht";

const LONG_TEXT: &str = "Wir suchen ab sofort einen erfahrenen Softwareentwickler, der unser \
    Team bei der Entwicklung moderner Webanwendungen unterstützt. Zu Ihren Aufgaben gehören \
    die Konzeption, Implementierung und Wartung von Backend-Systemen in Java und Kotlin. \
    Sie verfügen über ein abgeschlossenes Studium der Informatik, mindestens 3 Jahre \
    Berufserfahrung und sehr gute Deutschkenntnisse. Wir bieten flexible Arbeitszeiten, \
    30 Tage Urlaub, betriebliche Altersvorsorge und ein motiviertes Team.";

fn pipeline() -> FeatureUnitPipeline {
    let stopwords = StopwordSet::from_words(["und", "der", "die", "ein", "wir", "sie", "in", "von"]);
    FeatureUnitPipeline::new(FusConfig::default(), Arc::new(stopwords))
}

fn bench_pipeline(c: &mut Criterion) {
    let pipeline = pipeline();
    let mut group = c.benchmark_group("Pipeline");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    group.bench_function("short_paragraph", |b| {
        b.iter(|| pipeline.process(black_box(SHORT_TEXT)))
    });
    group.bench_function("long_paragraph", |b| {
        b.iter(|| pipeline.process(black_box(LONG_TEXT)))
    });

    group.finish();
}

fn bench_ngrams(c: &mut Criterion) {
    let tokens = convert::tokenize(&convert::replace(LONG_TEXT));
    let mut group = c.benchmark_group("N-grams");

    group.bench_function("isolated", |b| {
        b.iter(|| convert::gen_ngrams(black_box(tokens.clone()), &[3, 4], false))
    });
    group.bench_function("continuous", |b| {
        b.iter(|| convert::gen_ngrams(black_box(tokens.clone()), &[3, 4], true))
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_ngrams);
criterion_main!(benches);
