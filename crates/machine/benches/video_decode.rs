use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pac80_core::types::Frame;
use pac80_machine::memory::RAM_SIZE;
use pac80_machine::video::{render, HEIGHT, WIDTH};

/// Fill both planes of the low bank with a checker pattern so the decoder
/// takes both branches.
fn patterned_ram() -> Vec<u8> {
    let mut ram = vec![0u8; RAM_SIZE];
    for (i, byte) in ram[0x11810..0x1D810].iter_mut().enumerate() {
        *byte = if i % 2 == 0 { 0xAA } else { 0x55 };
    }
    ram
}

fn bench_render(c: &mut Criterion) {
    let ram = patterned_ram();
    let mut frame = Frame::new(WIDTH as u32, HEIGHT as u32);

    c.bench_function("framebuffer_decode", |b| {
        b.iter(|| {
            render(black_box(&ram), false, &mut frame);
            black_box(&frame);
        })
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
