pub const fn parse_hex(c: u8) -> Result<u8, &'static str> {
    let c = match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => return Err("Invalid hex character"),
    };
    Ok(c)
}

/// Parses the two hex digits at `b[i..i + 2]` into a byte.
pub const fn parse_byte(b: &[u8], i: usize) -> Result<u8, &'static str> {
    let high = match parse_hex(b[i]) {
        Ok(val) => val,
        Err(e) => return Err(e),
    };
    let low = match parse_hex(b[i + 1]) {
        Ok(val) => val,
        Err(e) => return Err(e),
    };
    Ok((high << 4) | low)
}

/// Formats bytes as space-separated lowercase hex, 16 per line.
pub fn hex_dump(data: &[u8]) -> String {
    data.chunks(16)
        .map(|line| {
            line.iter()
                .map(|b| format!("{b:02x}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
