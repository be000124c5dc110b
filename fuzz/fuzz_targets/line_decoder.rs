//! Fuzz target for the line decoding path
//!
//! Feeds raw bytes through the codec and every decoded line through the
//! grammar decoder and mode interpretation. None of them may panic.

#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use slirc_client::isupport::CapabilityTable;
use slirc_client::{mode, Line, LineCodec};
use tokio_util::codec::Decoder;

fuzz_target!(|data: &[u8]| {
    let mut codec = LineCodec::new();
    let mut buf = BytesMut::from(data);
    let table = CapabilityTable::default();

    while let Ok(Some(raw)) = codec.decode_eof(&mut buf) {
        if let Some(line) = Line::parse(&raw) {
            if let (Some(flags), Some(params)) = (line.param(1), line.params().get(2..)) {
                let _ = mode::interpret(flags, params, &table);
            }
        }
    }

    // Outgoing sanitization - should never panic
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = LineCodec::sanitize(input.to_owned());
    }
});
