// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![no_main]

use std::sync::OnceLock;

use jpeg422::{Codec, CodecOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    static CODECS: OnceLock<[Codec; 2]> = OnceLock::new();
    let codecs = CODECS.get_or_init(|| {
        [
            Codec::new(32, 16, CodecOptions::default().with_threads(0)).unwrap(),
            Codec::new(32, 16, CodecOptions::default().with_threads(2)).unwrap(),
        ]
    });
    let single = codecs[0].decompress(data);
    let threaded = codecs[1].decompress(data);
    match (single, threaded) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(_), Err(_)) => {}
        (a, b) => panic!("decoders disagree: {:?} vs {:?}", a.is_ok(), b.is_ok()),
    }
});
