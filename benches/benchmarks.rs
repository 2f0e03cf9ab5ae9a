use criterion::{black_box, criterion_group, criterion_main, Criterion};

use probe_scan::config::SearchConfig;
use probe_scan::search::{ScanProgress, StrandScanner};
use probe_scan::similarity::{AlgorithmId, Scorer, ScorerSettings, SimilarityScorer};
use probe_scan::util::dna;

fn make_reference(len: usize) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut seq = Vec::with_capacity(len);
    let mut x: u32 = 42;
    for _ in 0..len {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        seq.push(bases[(x >> 16) as usize % 4]);
    }
    dna::normalize_seq(&seq)
}

fn bench_per_offset_scores(c: &mut Criterion) {
    let reference = make_reference(1_000);
    let query = reference[300..320].to_vec();
    let settings = ScorerSettings::default();

    for id in [AlgorithmId::TextEdit, AlgorithmId::Direct, AlgorithmId::Consistency, AlgorithmId::Blat] {
        let Ok(mut scorer) = SimilarityScorer::build(id, &settings) else { continue };
        c.bench_function(&format!("{}_score_20bp", id), |b| {
            b.iter(|| {
                let mut total = 0.0;
                for offset in 0..100 {
                    total += scorer.score(black_box(&query), black_box(&reference), offset).unwrap_or(0.0);
                }
                black_box(total)
            })
        });
    }
}

fn bench_edit_render(c: &mut Criterion) {
    let reference = make_reference(200);
    let mut query = reference[50..80].to_vec();
    query[10] = b'a';
    query.remove(20);
    query.push(b'g');
    let Ok(mut scorer) = SimilarityScorer::build(AlgorithmId::TextEdit, &ScorerSettings::default()) else {
        return;
    };

    c.bench_function("textedit_render_30bp", |b| {
        b.iter(|| black_box(scorer.render(black_box(&query), black_box(&reference), 50)))
    });
}

fn bench_strand_scan(c: &mut Criterion) {
    let reference = make_reference(20_000);
    let query = reference[7_000..7_020].to_vec();
    let config = SearchConfig::default()
        .with_weight(AlgorithmId::Direct, 1)
        .with_weight(AlgorithmId::Consistency, 1);
    let progress = ScanProgress::new();

    c.bench_function("strand_scan_20kbp_direct_consistency", |b| {
        b.iter(|| {
            let scanner = StrandScanner {
                name: "bench",
                query: &query,
                strand: &reference,
                is_reverse: false,
                config: &config,
                pattern: None,
                filter: None,
                progress: &progress,
            };
            black_box(scanner.scan().map(|v| v.len()).unwrap_or(0))
        })
    });
}

criterion_group!(benches, bench_per_offset_scores, bench_edit_render, bench_strand_scan);
criterion_main!(benches);
