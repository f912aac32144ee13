//! Codec benchmarks
//!
//! Inventory reports arrive back to back at several hundred frames per
//! second, so CRC and decode are the hot path on the host side.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use cfrust_core::crc::crc16;
use cfrust_core::{FrameBuffer, FrameKind, Packet};

fn tag_report(code_len: usize) -> Vec<u8> {
    let mut payload = vec![0xFF, 0x9C, 0x01, 0x05, 0x12, 0x34, 0x30, 0x00, code_len as u8];
    payload.extend((0..code_len).map(|i| i as u8));
    payload
}

fn bench_crc(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc16");
    for size in [8usize, 64, 512, 4096] {
        let data: Vec<u8> = (0..size).map(|i| (i * 7) as u8).collect();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| crc16(black_box(data)))
        });
    }
    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let packet = Packet::command(0xFF, 0x0003, tag_report(12));
    c.bench_function("encode_command", |b| b.iter(|| black_box(&packet).encode()));
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_report");
    for code_len in [12usize, 62, 255] {
        let frame = Packet::response(0xFF, 0x0001, 0x00, tag_report(code_len))
            .encode()
            .map(|b| b.to_vec())
            .unwrap_or_default();
        group.throughput(Throughput::Bytes(frame.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(code_len), &frame, |b, frame| {
            b.iter(|| Packet::decode(black_box(frame), FrameKind::Response))
        });
    }
    group.finish();
}

fn bench_stream(c: &mut Criterion) {
    let frame = Packet::response(0xFF, 0x0001, 0x00, tag_report(12))
        .encode()
        .map(|b| b.to_vec())
        .unwrap_or_default();
    let stream: Vec<u8> = frame.iter().copied().cycle().take(frame.len() * 100).collect();

    c.bench_function("frame_buffer_100_reports", |b| {
        b.iter(|| {
            let mut buffer = FrameBuffer::new();
            let mut count = 0;
            for chunk in stream.chunks(64) {
                buffer.push(chunk);
                while let Ok(Some(_)) = buffer.next_frame(FrameKind::Response) {
                    count += 1;
                }
            }
            black_box(count)
        })
    });
}

criterion_group!(benches, bench_crc, bench_encode, bench_decode, bench_stream);
criterion_main!(benches);
