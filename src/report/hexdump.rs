//! Hexdump rendering for binary artifact mismatches.

use std::fmt::Write;

const ROW: usize = 16;

/// Render `bytes` as rows of `offset  hex bytes  |ascii|`
pub fn hexdump(bytes: &[u8]) -> String {
    let mut dump = String::new();
    for (row, chunk) in bytes.chunks(ROW).enumerate() {
        let _ = write!(dump, "{:08x}  ", row * ROW);
        for i in 0..ROW {
            if i == 8 {
                dump.push_str(" -");
            }
            match chunk.get(i) {
                Some(b) => {
                    let _ = write!(dump, " {:02x}", b);
                }
                None => dump.push_str("   "),
            }
        }
        dump.push_str("  |");
        for i in 0..ROW {
            let c = chunk.get(i).copied().unwrap_or(b' ');
            dump.push(if (32..=126).contains(&c) { c as char } else { '.' });
        }
        dump.push_str("|\n");
    }
    dump
}
