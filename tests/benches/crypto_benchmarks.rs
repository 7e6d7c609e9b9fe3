//! # Papr Crypto Benchmarks
//!
//! | Group | Operation |
//! |-------|-----------|
//! | passphrase | envelope encrypt/decrypt at test and default cost |
//! | review-signature | digest, sign and verify a review |
//! | review-round | seal and open rounds of growing size |

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use papr_03_review_rounds::format_reviews;
use shared_crypto::passphrase::{decrypt, encrypt_with_cost};
use shared_crypto::{signable_digest, RsaKeyPair, ScryptCost, Secp256k1KeyPair};

fn bench_passphrase_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("passphrase");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));

    let manuscript = vec![0x25u8; 256 * 1024];
    let costs = [
        ("fast", ScryptCost { n: 1024, r: 8, p: 1 }),
        ("default", ScryptCost::DEFAULT),
    ];
    for (label, cost) in costs {
        let envelope = encrypt_with_cost("correct horse battery", &manuscript, cost).unwrap();

        group.throughput(Throughput::Bytes(manuscript.len() as u64));
        group.bench_function(BenchmarkId::new("encrypt", label), |b| {
            b.iter(|| encrypt_with_cost("correct horse battery", black_box(&manuscript), cost))
        });
        group.bench_function(BenchmarkId::new("decrypt", label), |b| {
            b.iter(|| decrypt("correct horse battery", black_box(&envelope)))
        });
    }

    group.finish();
}

fn bench_review_signature(c: &mut Criterion) {
    let mut group = c.benchmark_group("review-signature");

    let keypair = Secp256k1KeyPair::generate();
    let public_key = keypair.public_key();
    let claim_hash = [0x5au8; 20];
    let body = "Review for submission paper_preprint\n\n".to_string() + &"Sound. ".repeat(400);
    let digest = signable_digest("1700000000", &claim_hash, body.as_bytes());
    let signature = keypair.sign_prehash(&digest).unwrap();

    group.bench_function("digest", |b| {
        b.iter(|| signable_digest("1700000000", &claim_hash, black_box(body.as_bytes())))
    });
    group.bench_function("sign", |b| b.iter(|| keypair.sign_prehash(black_box(&digest))));
    group.bench_function("verify", |b| {
        b.iter(|| public_key.verify_prehash(black_box(&digest), &signature))
    });

    group.finish();
}

fn bench_review_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("review-round");
    group.sample_size(20);

    let author = RsaKeyPair::generate().unwrap();
    let public_key = author.public_key();

    for reviewers in [1usize, 3, 10] {
        let bodies: Vec<String> = (0..reviewers)
            .map(|i| format!("Review {i}\n\n{}", "Needs more data. ".repeat(100)))
            .collect();
        let text = format_reviews(&bodies);
        let sealed = public_key.encrypt(text.as_bytes()).unwrap();

        group.throughput(Throughput::Elements(reviewers as u64));
        group.bench_with_input(BenchmarkId::new("seal", reviewers), &text, |b, text| {
            b.iter(|| public_key.encrypt(black_box(text.as_bytes())))
        });
        group.bench_with_input(BenchmarkId::new("open", reviewers), &sealed, |b, sealed| {
            b.iter(|| author.decrypt(black_box(sealed)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_passphrase_envelope,
    bench_review_signature,
    bench_review_round
);
criterion_main!(benches);
