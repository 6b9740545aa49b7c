use bitmsg::{Field, Fields, Message, field_spec, fields};
use criterion::{Criterion, criterion_group, criterion_main};

field_spec!(Priority: u8 [3]);
field_spec!(Reserved: u8 [1]);
field_spec!(Page: u8 [1]);
field_spec!(Format: u8 [8]);
field_spec!(Specific: u8 [8]);
field_spec!(Source: u8 [8]);
field_spec!(Padding: u8 [3]);
field_spec!(Payload: u32 [32], order = MsbFirst);

type Frame = Fields![Priority, Reserved, Page, Format, Specific, Source, Padding, Payload];

fn gen_frame() -> Message<Frame> {
    Message::new(
        0u32,
        fields![
            Field::any(),
            Field::equal_to(0),
            Field::any(),
            Field::greater_equal_to(0xF0),
            Field::any(),
            Field::not_equal_to(0xFE),
            Field::equal_to(0),
            Field::any(),
        ],
    )
}

fn gen_packet(total_bytes: usize) -> Vec<u8> {
    // deterministic, reserved and padding bits cleared, format byte >= 0xF0
    let mut data: Vec<u8> = (0..total_bytes).map(|i| (i * 31 % 256) as u8).collect();
    data[0] = 0b1111_0101;
    data[1] = 0xFF;
    data[3] &= 0b0001_1111;
    data
}

fn bench_decode(c: &mut Criterion) {
    let mut frame = gen_frame();
    let packet = gen_packet(Message::<Frame>::BYTES);
    assert!(frame.decode(&packet, 0));

    c.bench_function("decode_frame", |b| {
        b.iter(|| frame.decode(std::hint::black_box(&packet), 0))
    });
}

fn bench_encode(c: &mut Criterion) {
    let mut frame = gen_frame();
    let packet = gen_packet(Message::<Frame>::BYTES);
    assert!(frame.decode(&packet, 0));
    assert_eq!(frame.encode(), packet);

    c.bench_function("encode_frame", |b| b.iter(|| frame.encode()));

    let mut out = [0u8; 8];
    c.bench_function("encode_frame_into", |b| {
        b.iter(|| frame.encode_into(std::hint::black_box(&mut out)))
    });
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
