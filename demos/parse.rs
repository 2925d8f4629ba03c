use hl7_cursor::Message;

const SAMPLE: &str = "MSH|^~\\&|APP|FAC|DEST|DESTFAC|20240101000000||ADT^A01|1|P|2.3\r\
EVN|A01|20240101000000\r\
PID|1||12345^^^FAC^MR||Doe^John\r\
PV1|1|I|ICU^101^1";

fn main() {
    for _ in 0..100_000 {
        Message::new(SAMPLE).expect("can parse message");
    }
}
