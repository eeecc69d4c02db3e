/// Share lists in the shape a Windows server returns them.
pub struct TestShares;

impl TestShares {
    pub const WINDOWS_DEFAULT: &'static [(&'static str, u32, &'static str)] = &[
        ("ADMIN$", 0x8000_0000, "Remote Admin"),
        ("C$", 0x8000_0000, "Default share"),
        ("IPC$", 0x8000_0003, "Remote IPC"),
        ("MyShare", 0, ""),
        ("PublicShare", 0, ""),
    ];
}

/// Encodes a `NetrShareEnum` level 1 response PDU, laid out the way servers
/// send it: PDU header, info level, container, `SHARE_INFO_1` array, string
/// table, then total entries, resume handle and status.
pub struct ShareEnumResponseBuilder {
    stub: Vec<u8>,
    strings: Vec<u8>,
    count: u32,
    trailer: bool,
}

impl ShareEnumResponseBuilder {
    pub fn new() -> Self {
        Self {
            stub: vec![],
            strings: vec![],
            count: 0,
            trailer: true,
        }
    }

    pub fn with_shares(shares: &[(&str, u32, &str)]) -> Self {
        shares
            .iter()
            .fold(Self::new(), |b, &(name, share_type, comment)| {
                b.share(name, share_type, comment)
            })
    }

    pub fn share(self, name: &str, share_type: u32, comment: &str) -> Self {
        let name: Vec<u16> = name.encode_utf16().collect();
        let comment: Vec<u16> = comment.encode_utf16().collect();
        self.raw_share(&name, share_type, &comment)
    }

    /// Adds a share whose strings are given as raw code units, terminator excluded.
    pub fn raw_share(mut self, name: &[u16], share_type: u32, comment: &[u16]) -> Self {
        let referent = 0x0002_0000 + 8 * self.count;
        push_u32(&mut self.stub, referent);
        push_u32(&mut self.stub, share_type);
        push_u32(&mut self.stub, referent + 4);
        push_string(&mut self.strings, name);
        push_string(&mut self.strings, comment);
        self.count += 1;
        self
    }

    /// Ends the PDU right after the last string, padding included.
    pub fn without_trailer(mut self) -> Self {
        self.trailer = false;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut body = vec![];
        push_u32(&mut body, 1); // level
        push_u32(&mut body, 1); // container switch
        push_u32(&mut body, 0x0002_0000); // container referent
        push_u32(&mut body, self.count); // entries read
        push_u32(&mut body, 0x0002_0004); // array referent
        push_u32(&mut body, self.count); // max count
        body.extend_from_slice(&self.stub);
        body.extend_from_slice(&self.strings);
        if self.trailer {
            push_u32(&mut body, self.count); // total entries
            push_u32(&mut body, 0); // null resume handle
            push_u32(&mut body, 0); // status
        }

        let frag_length = 24 + body.len();
        let mut pdu = vec![0x5, 0x0, 0x2, 0x3, 0x10, 0x0, 0x0, 0x0];
        pdu.extend_from_slice(&(frag_length as u16).to_le_bytes());
        pdu.extend_from_slice(&[0x0, 0x0]); // auth length
        push_u32(&mut pdu, 1); // call id
        push_u32(&mut pdu, body.len() as u32); // alloc hint
        pdu.extend_from_slice(&[0x0, 0x0, 0x0, 0x0]); // context id, cancel count, reserved
        pdu.extend_from_slice(&body);
        pdu
    }
}

fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_string(buf: &mut Vec<u8>, units: &[u16]) {
    let count = units.len() as u32 + 1;
    push_u32(buf, count);
    push_u32(buf, 0);
    push_u32(buf, count);
    for unit in units.iter().chain(std::iter::once(&0)) {
        buf.extend_from_slice(&unit.to_le_bytes());
    }
    if count % 2 == 1 {
        buf.extend_from_slice(&[0x0, 0x0]);
    }
}
