use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hl7_cursor::Message;

const SAMPLE: &str = "MSH|^~\\&|APP|FAC|DEST|DESTFAC|20240101000000||ADT^A01|1|P|2.3\r\
EVN|A01|20240101000000\r\
PID|1||12345^^^FAC^MR||Doe^John\r\
PV1|1|I|ICU^101^1";

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("parse adt^a01", |b| {
        b.iter(|| Message::new(black_box(SAMPLE)).expect("can parse message"));
    });

    c.bench_function("deep path read", |b| {
        let message = Message::new(SAMPLE).expect("can parse message");
        b.iter(|| message.segment(black_box(4)).get(3).get(1).get(1).value());
    });

    c.bench_function("deep path write", |b| {
        let message = Message::new(SAMPLE).expect("can parse message");
        b.iter(|| {
            message
                .segment(black_box(3))
                .get(5)
                .get(1)
                .get(1)
                .set_value("Doe");
        });
    });

    c.bench_function("locate cursor", |b| {
        let message = Message::new(SAMPLE).expect("can parse message");
        let offset = message.value().find("101").unwrap();
        b.iter(|| message.locate(black_box(offset)));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
