use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use clusterdwt::{dwt, dwt_length, ExtensionMode, Sample, Wavelet, WaveletFamily, WaveletKind};

const LEN: usize = 4096;

fn bench_format<S: Sample>(c: &mut Criterion, name: &str, signal: &[S]) {
    let mut group = c.benchmark_group(format!("dwt_{name}"));
    for family in [WaveletFamily::Haar, WaveletFamily::Db2, WaveletFamily::Db4] {
        let bank = family.filter_bank::<S>();
        let w = bank.wavelet();
        let out = dwt_length(signal.len(), w.len());
        let mut a = vec![S::default(); out];
        let mut d = vec![S::default(); out];
        group.bench_with_input(BenchmarkId::new(format!("{family:?}"), LEN), &w, |b, w| {
            b.iter(|| {
                dwt(black_box(signal), w, ExtensionMode::Symmetric, &mut a, &mut d).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_formats(c: &mut Criterion) {
    let f32s: Vec<f32> = (0..LEN).map(|i| (i % 97) as f32 / 97.0 - 0.5).collect();
    let q31: Vec<i32> = f32s.iter().map(|&v| i32::quantize(v as f64)).collect();
    let q15: Vec<i16> = f32s.iter().map(|&v| i16::quantize(v as f64)).collect();
    let q7: Vec<i8> = f32s.iter().map(|&v| i8::quantize(v as f64 * 0.5)).collect();
    bench_format(c, "f32", &f32s);
    bench_format(c, "q31", &q31);
    bench_format(c, "q15", &q15);
    bench_format(c, "q7", &q7);
}

fn bench_haar_fast_path(c: &mut Criterion) {
    let signal: Vec<i32> = (0..LEN as i32).map(|i| (i % 1000) << 20).collect();
    let bank = WaveletFamily::Haar.filter_bank::<i32>();
    let fast = bank.wavelet();
    let generic = Wavelet::new(WaveletKind::Generic, fast.dec_lo(), fast.dec_hi()).unwrap();
    let out = dwt_length(signal.len(), 2);
    let mut a = vec![0i32; out];
    let mut d = vec![0i32; out];

    c.bench_function("haar_fast_path", |b| {
        b.iter(|| dwt(black_box(&signal), &fast, ExtensionMode::Zero, &mut a, &mut d).unwrap());
    });
    c.bench_function("haar_generic_engine", |b| {
        b.iter(|| dwt(black_box(&signal), &generic, ExtensionMode::Zero, &mut a, &mut d).unwrap());
    });
}

criterion_group!(benches, bench_formats, bench_haar_fast_path);
criterion_main!(benches);
