// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fru::{Document, LengthUnit};

const FIXTURE: &[u8] = include_bytes!("../../../test/mitx-fru.bin");

fn decode(image: &[u8]) -> Document {
    Document::decode(image).unwrap()
}

fn set_and_update(image: &[u8]) -> Vec<u8> {
    let mut document = decode(image);
    document.set_mac(1, [0x4c, 0xa5, 0x15, 0x00, 0x00, 0x02]).unwrap();
    document.set_boot_device("nvme0n1");
    fru::update(image, &document, LengthUnit::Bytes).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("decode", |b| b.iter(|| decode(black_box(FIXTURE))));
    c.bench_function("set and update", |b| b.iter(|| set_and_update(black_box(FIXTURE))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
