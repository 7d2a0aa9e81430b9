use std::sync::Arc;
use std::time::Instant;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use deckgen::{
    CardId, CardRecord, DeckConstraints, DeckRuntime, DeckRuntimeConfig, DeckService,
    InMemoryCardRepository,
};

const TYPES: [(&str, &str); 6] = [
    ("Artifact", ""),
    ("Sorcery", "Draw two cards."),
    ("Instant", "Destroy target creature."),
    ("Sorcery", "Destroy all creatures."),
    ("Creature — Elf", "Flash"),
    ("Land", ""),
];

const COLORS: [&str; 5] = ["['W']", "['U']", "['B']", "['R']", "['G']"];

fn make_catalog() -> Arc<InMemoryCardRepository> {
    let repo = InMemoryCardRepository::with_seed(2024).unwrap();

    repo.insert(
        CardRecord::new("cmdr", "Bench Commander", "Legendary Creature — Human", Some(5.0))
            .with_colors("['W', 'U', 'B']"),
    )
    .unwrap();
    for name in ["Plains", "Island", "Swamp", "Mountain", "Forest", "Wastes"] {
        repo.insert(CardRecord::new(
            name.to_lowercase(),
            name,
            format!("Basic Land — {name}"),
            Some(0.1),
        ))
        .unwrap();
    }

    // 6000 cards spread across roles, colors and prices from 0.05 to 50.
    for i in 0..6000u32 {
        let (type_line, oracle) = TYPES[(i % 6) as usize];
        let colors = COLORS[(i % 5) as usize];
        let price = 0.05 + f64::from(i % 1000) * 0.05;
        repo.insert(
            CardRecord::new(format!("card-{i}"), format!("Card {i}"), type_line, Some(price))
                .with_oracle_text(oracle)
                .with_colors(colors),
        )
        .unwrap();
    }

    Arc::new(repo)
}

fn bench_single_build(c: &mut Criterion) {
    let service = DeckService::new(make_catalog());
    let commander = CardId::new("cmdr");

    let mut group = c.benchmark_group("deck_build");
    group.throughput(Throughput::Elements(1));
    for budget in [25.0, 250.0, 1_000_000.0] {
        let constraints = DeckConstraints::new(budget);
        group.bench_function(format!("single/max_price_{budget}"), |b| {
            b.iter(|| service.generate_deck(&commander, &constraints).unwrap());
        });
    }
    group.finish();
}

fn bench_runtime_throughput(c: &mut Criterion) {
    c.bench_function("deck_build/runtime_4_workers", |b| {
        b.iter_custom(|iters| {
            let runtime = DeckRuntime::new(
                DeckService::new(make_catalog()),
                DeckRuntimeConfig {
                    workers: 4,
                    queue_capacity: 4096,
                    build_timeout: None,
                },
            )
            .unwrap();

            // Submit in batches no larger than the queue so nothing is rejected.
            let start = Instant::now();
            let mut remaining = iters;
            while remaining > 0 {
                let batch = remaining.min(1024);
                let handles: Vec<_> = (0..batch)
                    .map(|_| {
                        runtime
                            .submit(CardId::new("cmdr"), DeckConstraints::new(250.0))
                            .unwrap()
                    })
                    .collect();
                for handle in handles {
                    let _ = handle.join().unwrap();
                }
                remaining -= batch;
            }
            start.elapsed()
        });
    });
}

criterion_group!(benches, bench_single_build, bench_runtime_throughput);
criterion_main!(benches);
