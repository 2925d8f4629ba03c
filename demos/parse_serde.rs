#[cfg(feature = "serde")]
fn main() {
    use hl7_cursor::Message;

    let message = Message::new("MSH|^~\\&|APP|FAC|DEST|DESTFAC|20240101000000||ADT^A01|1|P|2.3")
        .expect("can parse message");

    // `Message` itself isn't `Serialize` (it's reference-bearing); callers
    // serialize the plain-data pieces they care about instead.
    let separators = message.separators();
    let serialized = serde_json::to_string_pretty(&separators).expect("can serialize separators");
    println!("{}", serialized);
}

#[cfg(not(feature = "serde"))]
fn main() {
    println!("This example requires the 'serde' feature to be enabled");
}
