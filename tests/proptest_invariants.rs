//! Property tests for terminal invariants under arbitrary input

use proptest::prelude::*;

use vtgrid::core::Snapshot;
use vtgrid::parser::{Action, Parser, MAX_PARAMS};
use vtgrid::Terminal;

/// Bytes biased towards escape sequence material
fn vt_bytes() -> impl Strategy<Value = Vec<u8>> {
    let byte = prop_oneof![
        4 => any::<u8>(),
        2 => prop::sample::select(b"\x1b[;?0123456789".to_vec()),
        1 => prop::sample::select(b"ABCDEFGHJKLMPSTXdfmhlrsu@".to_vec()),
        1 => prop::sample::select(b"\r\n\t\x08\x07\x18\x1a".to_vec()),
    ];
    proptest::collection::vec(byte, 0..512)
}

fn snapshot_of(cols: usize, rows: usize, chunks: &[&[u8]]) -> Snapshot {
    let mut term = Terminal::new(cols, rows, 0).unwrap();
    for chunk in chunks {
        term.append(chunk).unwrap();
    }
    Snapshot::from_terminal(&term)
}

proptest! {
    #[test]
    fn cursor_stays_in_bounds(
        bytes in vt_bytes(),
        cols in 1usize..40,
        rows in 1usize..20,
    ) {
        let mut term = Terminal::new(cols, rows, 0).unwrap();
        term.append(&bytes).unwrap();

        let cursor = term.cursor();
        prop_assert!(cursor.col < term.cols());
        prop_assert!(cursor.row < term.rows());

        let screen = term.screen();
        prop_assert!(screen.scroll_top() < screen.scroll_bottom() || rows == 1);
        prop_assert!(screen.scroll_bottom() < rows);
    }

    #[test]
    fn grid_dimensions_never_change(
        bytes in vt_bytes(),
        cols in 1usize..40,
        rows in 1usize..20,
    ) {
        let snapshot = snapshot_of(cols, rows, &[&bytes]);

        prop_assert_eq!(snapshot.grid.len(), rows);
        for row in &snapshot.grid {
            prop_assert_eq!(row.len(), cols);
        }
    }

    #[test]
    fn split_point_does_not_matter(
        bytes in vt_bytes(),
        split in any::<prop::sample::Index>(),
    ) {
        let at = split.index(bytes.len() + 1);
        let whole = snapshot_of(20, 8, &[&bytes]);
        let halves = snapshot_of(20, 8, &[&bytes[..at], &bytes[at..]]);

        prop_assert_eq!(whole, halves);
    }

    #[test]
    fn byte_at_a_time_matches_whole(bytes in vt_bytes()) {
        let whole = snapshot_of(16, 6, &[&bytes]);
        let singles: Vec<&[u8]> = bytes.chunks(1).collect();
        let split = snapshot_of(16, 6, &singles);

        prop_assert_eq!(whole, split);
    }

    #[test]
    fn csi_params_are_bounded(
        params in proptest::collection::vec(any::<u32>(), 0..40),
        final_byte in prop::sample::select(b"ABCHJKmr".to_vec()),
    ) {
        let mut seq = b"\x1b[".to_vec();
        let joined: Vec<String> = params.iter().map(u32::to_string).collect();
        seq.extend_from_slice(joined.join(";").as_bytes());
        seq.push(final_byte);

        let mut parser = Parser::new();
        let actions = parser.parse(&seq);

        prop_assert_eq!(actions.len(), 1);
        match &actions[0] {
            Action::Csi(csi) => {
                prop_assert!(csi.params.len() <= MAX_PARAMS);
                prop_assert_eq!(csi.final_byte, final_byte);
            }
            other => prop_assert!(false, "expected CSI, got {:?}", other),
        }
    }

    #[test]
    fn printable_text_round_trips(text in "[a-zA-Z0-9 ]{0,30}") {
        let mut term = Terminal::new(40, 2, 0).unwrap();
        term.append(text.as_bytes()).unwrap();

        prop_assert_eq!(term.row_text(0).unwrap(), text.trim_end());
    }
}
