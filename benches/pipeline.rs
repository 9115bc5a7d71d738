// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use advisor_content::process;

const REPLY: &str = include_str!("../tests/fixtures/advisor_reply.md");

/// The reply repeated `copies` times, as a long multi-section answer.
fn long_reply(copies: usize) -> String {
    (0..copies).map(|_| REPLY).collect::<Vec<_>>().join("\n\n")
}

/// Prefixes at line boundaries, as seen on successive streaming ticks.
fn streaming_ticks(text: &str) -> Vec<&str> {
    text.match_indices('\n').map(|(idx, _)| &text[..idx]).chain([text]).collect()
}

// Benchmark identity (keep stable):
// - Group names: `pipeline.process`, `pipeline.render`, `pipeline.stream`
// - Case IDs: `reply`, `reply_x8`
fn benches_pipeline(c: &mut Criterion) {
    let cases = [("reply", REPLY.to_owned()), ("reply_x8", long_reply(8))];

    {
        let mut group = c.benchmark_group("pipeline.process");
        for (case_id, text) in &cases {
            group.throughput(Throughput::Bytes(text.len() as u64));
            group.bench_function(*case_id, |b| b.iter(|| black_box(process(black_box(text)))));
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("pipeline.render");
        for (case_id, text) in &cases {
            let pass = process(text);
            group.throughput(Throughput::Bytes(text.len() as u64));
            group.bench_function(*case_id, |b| b.iter(|| black_box(pass.render())));
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("pipeline.stream");
        let ticks = streaming_ticks(REPLY);
        group.throughput(Throughput::Elements(ticks.len() as u64));
        group.bench_function("reply", |b| {
            b.iter(|| {
                for tick in &ticks {
                    black_box(process(black_box(tick)).render());
                }
            })
        });
        group.finish();
    }
}

criterion_group!(benches, benches_pipeline);
criterion_main!(benches);
