use hl7_cursor::Message;

const ADT_SRC: &str = "MSH|^~\\&|APP|FAC|DEST|DESTFAC|20240101000000||ADT^A01|1|P|2.3\r\
EVN|A01|20240101000000\r\
PID|1||12345^^^FAC^MR||Doe^John\r\
PV1|1|I|ICU^101^1";

#[test]
fn locate_the_cursor_on_a_component() {
    let message = Message::new(ADT_SRC).expect("can parse message");
    let offset = message.value().find("Doe").unwrap();

    let located = message.locate(offset).expect("offset is within the message");
    assert_eq!(located.segment.unwrap().get(0).value(), "PID");
    assert_eq!(located.field.unwrap().value(), "Doe^John");
    assert_eq!(located.component.unwrap().value(), "Doe");
}

#[test]
fn locate_the_cursor_on_a_later_component() {
    let message = Message::new(ADT_SRC).expect("can parse message");
    let offset = message.value().find("John").unwrap();

    let located = message.locate(offset).expect("offset is within the message");
    assert_eq!(located.component.unwrap().value(), "John");
}

#[test]
fn locate_past_the_end_of_the_message_finds_nothing() {
    let message = Message::new(ADT_SRC).expect("can parse message");
    assert!(message.locate(message.value().len() + 100).is_none());
}
