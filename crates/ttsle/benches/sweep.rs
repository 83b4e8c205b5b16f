//! Benchmarks for ALS and MALS sweeps on a Laplace-like operator
//!
//! The operator is the sum of `tridiag(-1, 2, -1)` acting on one site at a
//! time, which has rank 2 in the chain format.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use ttsle::{als, mals, tensor4_zeros, AlsOptions, ChainTensor, MalsOptions, Tensor4, Tensor4Ops};

fn set_laplace_block(core: &mut Tensor4<f64>, l: usize, r: usize) {
    let dim = core.row_dim();
    for s in 0..dim {
        core.set4(l, s, s, r, 2.0);
        if s + 1 < dim {
            core.set4(l, s, s + 1, r, -1.0);
            core.set4(l, s + 1, s, r, -1.0);
        }
    }
}

fn set_identity_block(core: &mut Tensor4<f64>, l: usize, r: usize) {
    for s in 0..core.row_dim() {
        core.set4(l, s, s, r, 1.0);
    }
}

fn laplace(order: usize, dim: usize) -> ChainTensor {
    let mut cores = Vec::with_capacity(order);
    for i in 0..order {
        let left = if i == 0 { 1 } else { 2 };
        let right = if i == order - 1 { 1 } else { 2 };
        let mut core: Tensor4<f64> = tensor4_zeros(left, dim, dim, right);
        match (left, right) {
            (1, 2) => {
                set_laplace_block(&mut core, 0, 0);
                set_identity_block(&mut core, 0, 1);
            }
            (2, 2) => {
                set_identity_block(&mut core, 0, 0);
                set_laplace_block(&mut core, 1, 0);
                set_identity_block(&mut core, 1, 1);
            }
            (2, 1) => {
                set_identity_block(&mut core, 0, 0);
                set_laplace_block(&mut core, 1, 0);
            }
            _ => set_laplace_block(&mut core, 0, 0),
        }
        cores.push(core);
    }
    ChainTensor::new(cores).unwrap()
}

fn random_vector(order: usize, dim: usize, rank: usize, seed: u64) -> ChainTensor {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let ranks: Vec<usize> = (0..=order)
        .map(|i| if i == 0 || i == order { 1 } else { rank })
        .collect();
    ChainTensor::random(&vec![dim; order], &vec![1; order], &ranks, &mut rng).unwrap()
}

fn bench_als(c: &mut Criterion) {
    let mut group = c.benchmark_group("als");
    let dim = 4;
    for &order in &[4, 8] {
        for &rank in &[2, 4] {
            let op = laplace(order, dim);
            let b = random_vector(order, dim, 2, 1);
            let guess = random_vector(order, dim, rank, 2);
            let options = AlsOptions::new(1);
            group.bench_with_input(
                BenchmarkId::new(format!("order{}", order), rank),
                &rank,
                |bencher, _| {
                    bencher.iter(|| als(black_box(&op), black_box(&guess), black_box(&b), &options))
                },
            );
        }
    }
    group.finish();
}

fn bench_mals(c: &mut Criterion) {
    let mut group = c.benchmark_group("mals");
    let dim = 4;
    for &order in &[4, 8] {
        for &max_rank in &[2, 4, 8] {
            let op = laplace(order, dim);
            let b = random_vector(order, dim, 2, 1);
            let guess = random_vector(order, dim, 1, 2);
            let options = MalsOptions::new(1).with_max_rank(max_rank);
            group.bench_with_input(
                BenchmarkId::new(format!("order{}", order), max_rank),
                &max_rank,
                |bencher, _| {
                    bencher.iter(|| mals(black_box(&op), black_box(&guess), black_box(&b), &options))
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_als, bench_mals);
criterion_main!(benches);
