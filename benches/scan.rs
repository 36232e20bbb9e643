// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use marginalia::scan::scan_page;

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group name in this file: `scan.page`
// - Case IDs are the fixture case IDs (`small`, `medium`, `large`); keep them
//   stable across refactors so results stay comparable over time.
fn checksum_report(report: &marginalia::scan::ScanReport) -> u64 {
    let mut acc = 0u64;
    acc = acc.wrapping_mul(131).wrapping_add(report.comments().len() as u64);
    acc = acc.wrapping_mul(131).wrapping_add(report.gui_comments().len() as u64);
    acc = acc.wrapping_mul(131).wrapping_add(report.errors().len() as u64);
    acc
}

fn benches_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan.page");

    for case in [fixtures::Case::Small, fixtures::Case::Medium, fixtures::Case::Large] {
        let doc = case.page();
        let (examples, comments) = case.dimensions();
        group.throughput(Throughput::Elements((examples * comments) as u64));
        group.bench_function(case.id(), |b| {
            b.iter(|| {
                let report = scan_page(black_box(&doc));
                black_box(checksum_report(&report))
            })
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_scan
}
criterion_main!(benches);
