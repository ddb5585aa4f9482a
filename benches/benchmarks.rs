use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use slider_magics::attacks::piece_attacks;
use slider_magics::blockers::BlockerMask;
use slider_magics::magic::{magic_index, MagicSearch, DEFAULT_ATTEMPT_BUDGET};
use slider_magics::types::{Bitboard, PieceType};

pub fn bench_magic_index(c: &mut Criterion) {
    let occ: Bitboard = 0x0001_0100_0000_0102;
    c.bench_function("magic index rook a1", |b| {
        b.iter(|| magic_index(black_box(0x0080_0010_2040_0080), black_box(occ), black_box(12)))
    });
}

pub fn bench_ray_attacks(c: &mut Criterion) {
    let occ: Bitboard = 0x0010_0000_1000_4400;
    c.bench_function("ray-walk rook e4", |b| {
        b.iter(|| piece_attacks(black_box(PieceType::Rook), black_box(28), black_box(occ)))
    });
    c.bench_function("ray-walk bishop e4", |b| {
        b.iter(|| piece_attacks(black_box(PieceType::Bishop), black_box(28), black_box(occ)))
    });
}

pub fn bench_enumerate_rook_corner(c: &mut Criterion) {
    let mask = BlockerMask::new(PieceType::Rook, 0);
    c.bench_function("enumerate 4096 rook a1 occupancies", |b| {
        b.iter(|| mask.occupancies().fold(0u64, |acc, occ| acc ^ black_box(occ)))
    });
}

pub fn bench_search_bishop(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat-sampling");
    group.sample_size(10);

    let occs: Vec<Bitboard> = BlockerMask::new(PieceType::Bishop, 27).occupancies().collect();
    group.bench_function("magic search bishop d4", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(black_box(17));
            MagicSearch::new(PieceType::Bishop, 27, 9, &occs).run(&mut rng, DEFAULT_ATTEMPT_BUDGET)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_magic_index,
    bench_ray_attacks,
    bench_enumerate_rook_corner,
    bench_search_bishop,
);
criterion_main!(benches);
