#![no_main]

use libfuzzer_sys::fuzz_target;
use plastream::{decode_records, Encoder, ProtocolConfig, ProtocolKind};

fuzz_target!(|data: &[u8]| {
    // First byte picks the protocol and widths, the rest is the wire buffer
    let Some((&selector, buf)) = data.split_first() else {
        return;
    };
    let kind = match selector & 0b11 {
        0 => ProtocolKind::TwoStream,
        1 => ProtocolKind::SingleStream,
        2 => ProtocolKind::SingleStreamLidar,
        _ => ProtocolKind::SingleStreamVariant,
    };
    let counter_bytes = usize::from((selector >> 2) & 0b111) + 1;
    let float_bytes = if selector & 0x20 == 0 { 4 } else { 8 };
    let config = ProtocolConfig::default()
        .with_kind(kind)
        .with_counter_bytes(counter_bytes)
        .with_coefficient_bytes(float_bytes)
        .with_input_bytes(float_bytes);

    // Arbitrary bytes must never panic; valid streams must re-encode identically
    let Ok(records) = decode_records(buf, &config) else {
        return;
    };
    let mut enc = Encoder::new(config).unwrap();
    for record in &records {
        enc.append(record).unwrap();
    }
    assert_eq!(enc.count(), records.len(), "count mismatch");
    assert_eq!(enc.size(), buf.len(), "re-encoded size mismatch");
});
