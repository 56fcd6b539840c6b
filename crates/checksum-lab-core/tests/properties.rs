use std::thread;

use checksum_lab_core::{Evaluation, IcmpEcho, evaluate, internet_checksum};
use checksum_lab_tree::{DerivationTree, HeaderLayout, Parser, normalize_hex, strip_whitespace};
use proptest::prelude::*;

/// Parses hex text with the default ICMP echo layout and returns the header
/// together with its checksum field.
fn icmp_tree(hex_text: &str) -> (DerivationTree, DerivationTree) {
    let layout = HeaderLayout::default();
    let grammar = layout.grammar().unwrap();
    let parser = Parser::new(&grammar, "<header>").unwrap();
    let header = parser.parse(&normalize_hex(hex_text).unwrap()).unwrap();
    let field = header.find_first(&layout.checksum_symbol()).unwrap().clone();
    (header, field)
}

fn header_bytes(header: &DerivationTree) -> Vec<u8> {
    hex::decode(strip_whitespace(&header.render())).unwrap()
}

#[test]
fn valid_echo_request_needs_no_correction() {
    let (header, field) = icmp_tree("0800F7FF00000000");
    assert!(evaluate(&header, &field).unwrap().is_valid());
}

#[test]
fn corrupted_echo_request_is_repaired() {
    let (header, field) = icmp_tree("0800000000010001");
    let result = evaluate(&header, &field).unwrap();
    let correction = result.correction().expect("checksum should be corrected");
    assert_eq!(correction.replacement().render(), "F7 FD ");

    let fixed = correction.apply(&header).unwrap();
    assert_eq!(strip_whitespace(&fixed.render()), "0800F7FD00010001");
    assert!(IcmpEcho::parse(&header_bytes(&fixed)).unwrap().has_valid_checksum());
}

#[test]
fn repair_with_payload() {
    let (header, field) = icmp_tree("08 00 12 34 00 2A 00 07 68 65 6C 6C 6F 21");
    let fixed = evaluate(&header, &field)
        .unwrap()
        .correction()
        .unwrap()
        .apply(&header)
        .unwrap();
    assert_eq!(internet_checksum(&header_bytes(&fixed)), 0);
}

#[test]
fn repair_with_maximum_size_payload() {
    let hex_text = format!("0800000000010001{}", "AB".repeat(65_000));
    let (header, field) = icmp_tree(&hex_text);
    assert_eq!(
        header.find_first("<payload>").unwrap().children().unwrap().len(),
        65_000
    );

    let fixed = evaluate(&header, &field)
        .unwrap()
        .correction()
        .expect("checksum should be corrected")
        .apply(&header)
        .unwrap();
    let packet = IcmpEcho::parse(&header_bytes(&fixed)).unwrap();
    assert_eq!(packet.payload.len(), 65_000);
    assert!(packet.has_valid_checksum());
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn trees_and_outcomes_are_thread_safe() {
    assert_send_sync::<DerivationTree>();
    assert_send_sync::<Evaluation>();
}

#[test]
fn concurrent_evaluations_agree() {
    let (header, field) = icmp_tree("0800000000010001");
    let replacements: Vec<String> = thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let (header, field) = (header.clone(), field.clone());
                scope.spawn(move || {
                    let result = evaluate(&header, &field).unwrap();
                    result.correction().unwrap().replacement().render()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert!(replacements.iter().all(|r| r == "F7 FD "));
    assert_eq!(strip_whitespace(&header.render()), "0800000000010001");
}

fn icmp_hex() -> impl Strategy<Value = String> {
    (
        any::<u8>(),
        any::<u8>(),
        any::<u16>(),
        any::<u16>(),
        any::<u16>(),
        prop::collection::vec(any::<[u8; 2]>(), 0..24),
    )
        .prop_map(|(message_type, code, checksum, identifier, sequence, words)| {
            let mut bytes = vec![message_type, code];
            bytes.extend(checksum.to_be_bytes());
            bytes.extend(identifier.to_be_bytes());
            bytes.extend(sequence.to_be_bytes());
            bytes.extend(words.into_iter().flatten());
            hex::encode(bytes)
        })
}

proptest! {
    #[test]
    fn prop_repaired_header_checksums_to_zero(hex_text in icmp_hex()) {
        let (header, field) = icmp_tree(&hex_text);
        let repaired = match evaluate(&header, &field).unwrap() {
            Evaluation::Valid => header,
            Evaluation::Correction(correction) => correction.apply(&header).unwrap(),
            other => panic!("unexpected outcome {}", other.label()),
        };
        prop_assert_eq!(internet_checksum(&header_bytes(&repaired)), 0);
    }

    #[test]
    fn prop_one_correction_reaches_fixed_point(hex_text in icmp_hex()) {
        let (header, field) = icmp_tree(&hex_text);
        if let Some(correction) = evaluate(&header, &field).unwrap().correction() {
            let fixed = correction.apply(&header).unwrap();
            let new_field = fixed.find_first("<checksum>").unwrap().clone();
            prop_assert!(new_field.shares_node(correction.replacement()));
            prop_assert!(evaluate(&fixed, &new_field).unwrap().is_valid());
        }
    }

    #[test]
    fn prop_correct_field_is_valid(hex_text in icmp_hex()) {
        let mut bytes = hex::decode(&hex_text).unwrap();
        bytes[2] = 0;
        bytes[3] = 0;
        let sum = internet_checksum(&bytes);
        bytes[2..4].copy_from_slice(&sum.to_be_bytes());

        let (header, field) = icmp_tree(&hex::encode_upper(&bytes));
        prop_assert!(evaluate(&header, &field).unwrap().is_valid());
    }

    #[test]
    fn prop_evaluation_leaves_input_untouched(hex_text in icmp_hex()) {
        let (header, field) = icmp_tree(&hex_text);
        let before = header.render();
        let _ = evaluate(&header, &field).unwrap();
        prop_assert_eq!(header.render(), before);
    }
}
