mod common;

use common::{ShareEnumResponseBuilder, TestShares};
use smb_rpc::{
    build_share_enum_request, parse_share_enum_pdu, parse_share_enum_response, Error, ShareKind,
    ShareRecord, DEFAULT_SHARE_INFO_LEVEL,
};

fn records(shares: &[(&str, u32, &str)]) -> Vec<ShareRecord> {
    shares
        .iter()
        .map(|&(name, share_type, comment)| ShareRecord {
            name: name.to_string(),
            share_type,
            comment: comment.to_string(),
        })
        .collect()
}

#[test_log::test]
fn test_windows_share_list() -> smb_rpc::Result<()> {
    let data = ShareEnumResponseBuilder::with_shares(TestShares::WINDOWS_DEFAULT).build();
    let shares = parse_share_enum_response(&data)?;
    assert_eq!(shares, records(TestShares::WINDOWS_DEFAULT));

    let ipc = shares.iter().find(|s| s.name == "IPC$").unwrap();
    assert!(ipc.share_type_flags().unwrap().is_win_ipc());
    let my_share = shares.iter().find(|s| s.name == "MyShare").unwrap();
    assert_eq!(my_share.share_type_flags().unwrap().kind(), ShareKind::Disk);
    Ok(())
}

#[test_log::test]
fn test_pdu_matches_raw_parse() -> smb_rpc::Result<()> {
    let data = ShareEnumResponseBuilder::with_shares(TestShares::WINDOWS_DEFAULT).build();
    assert_eq!(
        parse_share_enum_pdu(&data)?,
        parse_share_enum_response(&data)?
    );
    Ok(())
}

#[test_log::test]
fn test_padding_per_string() -> smb_rpc::Result<()> {
    // Odd/even unit counts in every combination of name and comment.
    let shares = [
        ("ab", 0, "abc"),
        ("abc", 1, "ab"),
        ("a", 2, "a"),
        ("abcd", 0, "abcd"),
        ("", 3, ""),
    ];
    let data = ShareEnumResponseBuilder::with_shares(&shares).build();
    assert_eq!(parse_share_enum_response(&data)?, records(&shares));
    Ok(())
}

#[test_log::test]
fn test_non_ascii_names() -> smb_rpc::Result<()> {
    let shares = [("Données", 0, "Partage é"), ("共有", 0, "𝄞 music")];
    let data = ShareEnumResponseBuilder::with_shares(&shares).build();
    assert_eq!(parse_share_enum_response(&data)?, records(&shares));
    Ok(())
}

#[test_log::test]
fn test_invalid_utf16_keeps_record() -> smb_rpc::Result<()> {
    let data = ShareEnumResponseBuilder::new()
        .share("First", 0, "ok")
        .raw_share(&[0x44, 0xdc00, 0x45], 0, &[0x63])
        .share("Last", 0, "")
        .build();
    let shares = parse_share_enum_response(&data)?;
    assert_eq!(shares.len(), 3);
    assert_eq!(shares[1].name, "");
    assert_eq!(shares[1].comment, "c");
    assert_eq!(shares[2].name, "Last");
    Ok(())
}

#[test_log::test]
fn test_missing_trailing_pad_returns_collected() -> smb_rpc::Result<()> {
    // "IPC$" comment "" has an odd unit count; drop its pad and everything after.
    let mut data = ShareEnumResponseBuilder::new()
        .share("IPC$", 0x8000_0003, "")
        .without_trailer()
        .build();
    data.truncate(data.len() - 2);
    let shares = parse_share_enum_response(&data)?;
    assert_eq!(shares, records(&[("IPC$", 0x8000_0003, "")]));
    Ok(())
}

#[test_log::test]
fn test_overstated_count_stops_at_end() -> smb_rpc::Result<()> {
    // Declares two shares, but the string table ends inside the first pad.
    let mut data = ShareEnumResponseBuilder::new()
        .share("A", 0, "")
        .share("B", 0, "")
        .without_trailer()
        .build();
    let strings_start = 48 + 2 * 12;
    let first_pair = (12 + 4) + (12 + 2 + 2);
    data.truncate(strings_start + first_pair - 2);
    let shares = parse_share_enum_response(&data)?;
    assert_eq!(shares, records(&[("A", 0, "")]));
    Ok(())
}

#[test_log::test]
fn test_truncated_string_fails() {
    let data = ShareEnumResponseBuilder::with_shares(TestShares::WINDOWS_DEFAULT)
        .without_trailer()
        .build();
    // Cut into the last string's array header.
    let data = &data[..data.len() - 6];
    assert!(matches!(
        parse_share_enum_response(data),
        Err(Error::MalformedResponse(_))
    ));
}

#[test_log::test]
fn test_fault_pdu() {
    let data = [
        0x5, 0x0, 0x3, 0x3, 0x10, 0x0, 0x0, 0x0, 0x20, 0x0, 0x0, 0x0, 0x1, 0x0, 0x0, 0x0, 0x20,
        0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x5, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0,
    ];
    assert!(matches!(parse_share_enum_pdu(&data), Err(Error::RpcFault(5))));
}

#[test_log::test]
fn test_unknown_pdu_type() {
    let mut data = ShareEnumResponseBuilder::with_shares(TestShares::WINDOWS_DEFAULT).build();
    data[2] = 0xf; // alter_context_resp
    assert!(matches!(
        parse_share_enum_pdu(&data),
        Err(Error::InvalidMessage(_))
    ));
}

#[test_log::test]
fn test_bind_ack_instead_of_response() {
    let data = [
        0x5, 0x0, 0xc, 0x3, 0x10, 0x0, 0x0, 0x0, 0x44, 0x0, 0x0, 0x0, 0x1, 0x0, 0x0, 0x0, 0xb8,
        0x10, 0xb8, 0x10, 0x29, 0x3b, 0x0, 0x0, 0xd, 0x0, 0x5c, 0x50, 0x49, 0x50, 0x45, 0x5c,
        0x73, 0x72, 0x76, 0x73, 0x76, 0x63, 0x0, 0x0, 0x1, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0, 0x0,
        0x4, 0x5d, 0x88, 0x8a, 0xeb, 0x1c, 0xc9, 0x11, 0x9f, 0xe8, 0x8, 0x0, 0x2b, 0x10, 0x48,
        0x60, 0x2, 0x0, 0x0, 0x0,
    ];
    assert!(matches!(
        parse_share_enum_pdu(&data),
        Err(Error::InvalidMessage(_))
    ));
}

#[test_log::test]
fn test_unsupported_version() {
    let mut data = ShareEnumResponseBuilder::with_shares(TestShares::WINDOWS_DEFAULT).build();
    data[0] = 0x4;
    assert!(matches!(
        parse_share_enum_pdu(&data),
        Err(Error::InvalidMessage(_))
    ));
}

#[test_log::test]
fn test_request_length_field() {
    for server_name in ["", "a", "ab", r"\\srv", r"\\localhost", r"\\192.168.1.20", "Sérveur"] {
        let data = build_share_enum_request(server_name, DEFAULT_SHARE_INFO_LEVEL);
        let units = server_name.encode_utf16().count() + 1;
        let pad = if units % 2 == 1 { 2 } else { 0 };
        assert_eq!(data.len(), 24 + 16 + units * 2 + pad + 32, "{server_name}");
        assert_eq!(u16::from_le_bytes([data[8], data[9]]) as usize, data.len());
        // The info level always lands 4-byte aligned.
        let level_offset = 24 + 16 + units * 2 + pad;
        assert_eq!(level_offset % 4, 0);
        assert_eq!(data[level_offset..level_offset + 4], [0x1, 0x0, 0x0, 0x0]);
    }
}
