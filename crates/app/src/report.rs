//! Symbol table listing for `huffpack inspect`.

use std::fmt::Write;

use huffpack_core::codec::Inspection;

/// Render the table stored in a compressed file, one row per symbol.
pub fn format_inspection(inspection: &Inspection) -> String {
    let mut out = String::new();
    let table = &inspection.table;

    let _ = writeln!(out, "Symbols: {}", table.len());
    let _ = writeln!(out, "Header:  {} bytes", table.header_len());

    let Some(tree) = &inspection.tree else {
        let _ = writeln!(out, "(empty input)");
        return out;
    };

    let _ = writeln!(out, "Nodes:   {}", tree.node_count());
    let _ = writeln!(out, "Average code length: {:.4} bits", tree.average_code_length());
    let _ = writeln!(out);
    let _ = writeln!(out, "byte  char  probability  len  code");
    for row in tree.table() {
        let _ = writeln!(
            out,
            "0x{:02x}  {:<4}  {:<11.9}  {:>3}  {}",
            row.symbol,
            printable(row.symbol),
            row.frequency,
            row.code.len(),
            row.code
        );
    }
    out
}

fn printable(byte: u8) -> String {
    match byte {
        b' ' => "' '".to_string(),
        b'\n' => "\\n".to_string(),
        b'\t' => "\\t".to_string(),
        b if b.is_ascii_graphic() => (b as char).to_string(),
        _ => ".".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huffpack_core::codec::{compress_bytes, inspect};

    #[test]
    fn test_format_inspection() {
        let compressed = compress_bytes(b"AAAB").unwrap();
        let text = format_inspection(&inspect(compressed.as_slice()).unwrap());

        assert!(text.contains("Symbols: 2"));
        assert!(text.contains("Header:  20 bytes"));
        assert!(text.contains("Average code length: 1.0000 bits"));
        assert!(text.contains("0x41  A     0.750000000    1  1"));
        assert!(text.contains("0x42  B     0.250000000    1  0"));
    }

    #[test]
    fn test_format_empty() {
        let text = format_inspection(&inspect(&[0u8, 0][..]).unwrap());
        assert!(text.contains("Symbols: 0"));
        assert!(text.contains("(empty input)"));
    }

    #[test]
    fn test_printable() {
        assert_eq!(printable(b'x'), "x");
        assert_eq!(printable(b' '), "' '");
        assert_eq!(printable(b'\n'), "\\n");
        assert_eq!(printable(0x00), ".");
        assert_eq!(printable(0xFF), ".");
    }
}
