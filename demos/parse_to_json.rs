//! Walk a parsed message's element tree and dump it as JSON. Unlike
//! `parse_serde.rs` (which serializes a single plain-data value), this walks
//! the live tree itself, since `Element`/`Message` hold `Rc<RefCell<_>>`
//! internals and aren't `Serialize` directly.

const SAMPLE: &str = "MSH|^~\\&|APP|FAC|DEST|DESTFAC|20240101000000||ADT^A01|1|P|2.3\r\
EVN|A01|20240101000000\r\
PID|1||12345^^^FAC^MR||Doe^John\r\
PV1|1|I|ICU^101^1";

#[cfg(feature = "serde")]
fn element_to_json(element: &hl7_cursor::Element) -> serde_json::Value {
    let children = element.descendant_elements();
    if children.len() <= 1 {
        return serde_json::Value::String(element.value());
    }
    serde_json::Value::Array(children.iter().map(element_to_json).collect())
}

#[cfg(feature = "serde")]
pub fn main() {
    use hl7_cursor::Message;

    let message = Message::new(SAMPLE).expect("can parse message");
    let segments: Vec<serde_json::Value> = message.segments().iter().map(element_to_json).collect();
    let as_json = serde_json::to_string_pretty(&segments).expect("can serialize to JSON");
    println!("{}", as_json);
}

#[cfg(not(feature = "serde"))]
pub fn main() {
    println!("This example requires the 'serde' feature to be enabled.");
}
