use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rrzip::{Config, Engine};

// Zipf-ish skew: cubing a uniform draw piles the mass onto the low ids,
// the shape the codebook is built to exploit.
fn skewed_sets(num_sets: usize, num_vertices: usize, seed: u64) -> Vec<Vec<u32>>
{
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_sets)
        .map(|_| {
            let len = rng.gen_range(4..40);
            let mut set: Vec<u32> = (0..len)
                .map(|_| {
                    let x: f64 = rng.gen();
                    (x * x * x * num_vertices as f64) as u32
                })
                .collect();
            set.sort_unstable();
            set.dedup();
            set
        })
        .collect()
}

fn bench_selection(c: &mut Criterion)
{
    let mut group = c.benchmark_group("selection");
    let sets = skewed_sets(5_000, 20_000, 7);
    let engine = Engine::new(
        20_000,
        Config {
            k: 32,
            ..Config::default()
        },
    )
    .unwrap();

    group.bench_function("compressed", |b| {
        b.iter(|| {
            let mut input = sets.clone();
            engine.select(&mut input)
        })
    });

    group.bench_function("uncompressed", |b| {
        b.iter(|| {
            let mut input = sets.clone();
            engine.select_uncompressed(&mut input)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_selection);
criterion_main!(benches);
