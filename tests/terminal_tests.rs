//! Scenario tests for the terminal
//!
//! Each test feeds a byte stream into a fresh terminal and checks the
//! resulting grid, cursor and attributes.

use vtgrid::core::Snapshot;
use vtgrid::{Color, Terminal};

fn run(cols: usize, rows: usize, input: &[u8]) -> Terminal {
    let mut term = Terminal::new(cols, rows, 100).expect("terminal");
    term.append(input).expect("append");
    term
}

fn text(term: &Terminal) -> String {
    Snapshot::from_terminal(term).to_text()
}

fn cursor(term: &Terminal) -> (usize, usize) {
    (term.cursor().row, term.cursor().col)
}

// ============================================================================
// Basic output
// ============================================================================

#[test]
fn test_clear_home_print() {
    let term = run(80, 24, b"\x1b[2J\x1b[HAB");

    assert_eq!(term.cell_at(0, 0).unwrap().ch, 'A');
    assert_eq!(term.cell_at(0, 1).unwrap().ch, 'B');
    assert_eq!(cursor(&term), (0, 2));
}

#[test]
fn test_bold_then_reset() {
    let term = run(80, 24, b"\x1b[1mX\x1b[0mY");

    assert!(term.cell_at(0, 0).unwrap().style.bold);
    assert!(!term.cell_at(0, 1).unwrap().style.bold);
}

#[test]
fn test_crlf_lines() {
    let term = run(20, 5, b"one\r\ntwo\r\nthree");
    assert_eq!(text(&term), "one\ntwo\nthree\n");
    assert_eq!(cursor(&term), (2, 5));
}

#[test]
fn test_bare_lf_keeps_column() {
    let term = run(20, 5, b"ab\ncd");
    assert_eq!(term.row_text(0).unwrap(), "ab");
    assert_eq!(term.row_text(1).unwrap(), "  cd");
}

#[test]
fn test_vt_and_ff_act_as_lf() {
    let term = run(20, 5, b"a\x0bb\x0cc");
    assert_eq!(cursor(&term), (2, 3));
}

#[test]
fn test_backspace_overwrite() {
    let term = run(20, 2, b"abc\x08\x08X");
    assert_eq!(term.row_text(0).unwrap(), "aXc");
}

#[test]
fn test_bell_is_ignored() {
    let term = run(20, 2, b"a\x07b");
    assert_eq!(term.row_text(0).unwrap(), "ab");
}

// ============================================================================
// Wrapping and scrolling
// ============================================================================

#[test]
fn test_wrap_to_next_row() {
    let term = run(5, 3, b"abcdeX");
    assert_eq!(term.row_text(0).unwrap(), "abcde");
    assert_eq!(term.cell_at(1, 0).unwrap().ch, 'X');
    assert_eq!(cursor(&term), (1, 1));
}

#[test]
fn test_wrap_on_last_row_scrolls() {
    let term = run(5, 2, b"\x1b[2;1Habcdef");
    assert_eq!(term.row_text(0).unwrap(), "abcde");
    assert_eq!(term.row_text(1).unwrap(), "f");
    assert_eq!(cursor(&term), (1, 1));
}

#[test]
fn test_full_row_then_crlf_leaves_blank_row() {
    let term = run(3, 3, b"abc\r\nX");
    assert_eq!(term.row_text(0).unwrap(), "abc");
    assert_eq!(term.row_text(1).unwrap(), "");
    assert_eq!(term.cell_at(2, 0).unwrap().ch, 'X');
    assert_eq!(cursor(&term), (2, 1));
}

#[test]
fn test_full_last_row_scrolls_immediately() {
    let term = run(3, 2, b"abcdef");
    assert_eq!(text(&term), "def\n");
    assert_eq!(term.row_text(1).unwrap(), "");
    assert_eq!(cursor(&term), (1, 0));
}

#[test]
fn test_linefeed_scrolls_at_bottom() {
    let mut input = Vec::new();
    for i in 0..10 {
        input.extend_from_slice(format!("line{}\r\n", i).as_bytes());
    }
    let term = run(10, 4, &input);

    assert_eq!(text(&term), "line7\nline8\nline9\n");
    assert_eq!(cursor(&term), (3, 0));
}

#[test]
fn test_scroll_region_confines_scrolling() {
    let term = run(
        10,
        5,
        b"top\x1b[5;1Hbottom\x1b[2;4r\x1b[2;1Ha\r\nb\r\nc\r\nd",
    );

    assert_eq!(term.row_text(0).unwrap(), "top");
    assert_eq!(term.row_text(1).unwrap(), "b");
    assert_eq!(term.row_text(2).unwrap(), "c");
    assert_eq!(term.row_text(3).unwrap(), "d");
    assert_eq!(term.row_text(4).unwrap(), "bottom");
}

#[test]
fn test_scroll_up_down_sequences() {
    let term = run(10, 3, b"a\r\nb\r\nc\x1b[S");
    assert_eq!(text(&term), "b\nc\n");

    let term = run(10, 3, b"a\r\nb\r\nc\x1b[T");
    assert_eq!(text(&term), "\na\nb\n");
}

#[test]
fn test_reverse_index_at_top() {
    let term = run(10, 3, b"a\r\nb\x1b[H\x1bM");
    assert_eq!(text(&term), "\na\nb\n");
}

#[test]
fn test_next_line_and_index() {
    let term = run(10, 3, b"ab\x1bEc\x1bDd");
    assert_eq!(term.row_text(1).unwrap(), "c");
    assert_eq!(term.row_text(2).unwrap(), " d");
}

// ============================================================================
// Cursor motion
// ============================================================================

#[test]
fn test_cursor_motion_clamps() {
    let term = run(10, 5, b"\x1b[100;100H");
    assert_eq!(cursor(&term), (4, 9));

    let term = run(10, 5, b"\x1b[3;3H\x1b[99A\x1b[99D");
    assert_eq!(cursor(&term), (0, 0));

    let term = run(10, 5, b"\x1b[99B\x1b[99C");
    assert_eq!(cursor(&term), (4, 9));
}

#[test]
fn test_zero_count_moves_one() {
    let term = run(10, 5, b"\x1b[3;3H\x1b[0A\x1b[0C");
    assert_eq!(cursor(&term), (1, 3));
}

#[test]
fn test_absolute_column_and_row() {
    let term = run(20, 10, b"\x1b[7G\x1b[4d");
    assert_eq!(cursor(&term), (3, 6));
}

#[test]
fn test_next_and_previous_line() {
    let term = run(20, 10, b"\x1b[5;5H\x1b[2E");
    assert_eq!(cursor(&term), (6, 0));

    let term = run(20, 10, b"\x1b[5;5H\x1b[3F");
    assert_eq!(cursor(&term), (1, 0));
}

#[test]
fn test_save_restore_via_esc_and_csi() {
    let term = run(20, 10, b"\x1b[3;4H\x1b7\x1b[H\x1b8");
    assert_eq!(cursor(&term), (2, 3));

    let term = run(20, 10, b"\x1b[5;6H\x1b[s\x1b[H\x1b[u");
    assert_eq!(cursor(&term), (4, 5));
}

#[test]
fn test_save_restore_includes_attributes() {
    let term = run(20, 2, b"\x1b[31m\x1b7\x1b[0m\x1b8X");
    assert_eq!(term.cell_at(0, 0).unwrap().fg, Color::RED);
}

#[test]
fn test_tab_stops() {
    let term = run(20, 2, b"\tA\tB");
    assert_eq!(term.cell_at(0, 4).unwrap().ch, 'A');
    assert_eq!(term.cell_at(0, 8).unwrap().ch, 'B');
}

#[test]
fn test_tab_fills_with_background() {
    let term = run(20, 2, b"\x1b[44m\t");
    assert_eq!(term.cell_at(0, 0).unwrap().bg, Color::BLUE);
    assert_eq!(term.cell_at(0, 3).unwrap().bg, Color::BLUE);
    assert_eq!(term.cell_at(0, 4).unwrap().bg, Color::Default);
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn test_erase_display_modes() {
    let term = run(5, 4, b"aaaaabbbbbccccc\x1b[2;3H\x1b[0J");
    assert_eq!(text(&term), "aaaaa\nbb\n");

    let term = run(5, 4, b"aaaaabbbbbccccc\x1b[2;3H\x1b[1J");
    assert_eq!(text(&term), "\n   bb\nccccc\n");

    let term = run(5, 4, b"aaaaabbbbbccccc\x1b[2;3H\x1b[3J");
    assert_eq!(text(&term), "\n");
}

#[test]
fn test_erase_line_modes() {
    let term = run(5, 2, b"abcde\x1b[1;3H\x1b[1K");
    assert_eq!(term.row_text(0).unwrap(), "   de");

    let term = run(5, 2, b"abcde\x1b[1;3H\x1b[2K");
    assert_eq!(term.row_text(0).unwrap(), "");
}

#[test]
fn test_erase_and_delete_chars() {
    let term = run(10, 1, b"abcdefgh\x1b[1;3H\x1b[2X");
    assert_eq!(term.row_text(0).unwrap(), "ab  efgh");

    let term = run(10, 1, b"abcdefgh\x1b[1;3H\x1b[2P");
    assert_eq!(term.row_text(0).unwrap(), "abefgh");

    let term = run(10, 1, b"abcdefgh\x1b[1;3H\x1b[2@");
    assert_eq!(term.row_text(0).unwrap(), "ab  cdefgh");
}

#[test]
fn test_insert_delete_lines_respect_region() {
    let term = run(5, 5, b"0\r\n1\r\n2\r\n3\r\n4\x1b[2;4r\x1b[2;1H\x1b[L");
    assert_eq!(text(&term), "0\n\n1\n2\n4\n");

    let term = run(5, 5, b"0\r\n1\r\n2\r\n3\r\n4\x1b[2;4r\x1b[2;1H\x1b[M");
    assert_eq!(text(&term), "0\n2\n3\n\n4\n");
}

// ============================================================================
// Attributes
// ============================================================================

#[test]
fn test_sgr_attributes() {
    let term = run(20, 1, b"\x1b[2mA\x1b[7mB\x1b[27mC\x1b[22mD");

    assert!(term.cell_at(0, 0).unwrap().style.dim);
    assert!(term.cell_at(0, 1).unwrap().style.inverse);
    assert!(!term.cell_at(0, 2).unwrap().style.inverse);
    assert!(!term.cell_at(0, 3).unwrap().style.dim);
}

#[test]
fn test_sgr_unknown_values_ignored_individually() {
    let term = run(20, 1, b"\x1b[4;1;5;32mA");
    let cell = term.cell_at(0, 0).unwrap();
    assert!(cell.style.bold);
    assert_eq!(cell.fg, Color::GREEN);
}

#[test]
fn test_sgr_omitted_param_is_reset() {
    let term = run(20, 1, b"\x1b[1;31m\x1b[;32mA");
    let cell = term.cell_at(0, 0).unwrap();
    assert!(!cell.style.bold);
    assert_eq!(cell.fg, Color::GREEN);
}

#[test]
fn test_extended_palette() {
    let term = run(20, 1, b"\x1b[38;5;123mA\x1b[48;5;7mB");
    assert_eq!(term.cell_at(0, 0).unwrap().fg, Color::Indexed(123));
    assert_eq!(term.cell_at(0, 1).unwrap().bg, Color::Indexed(7));
}

// ============================================================================
// Robustness
// ============================================================================

#[test]
fn test_unknown_csi_final_is_inert() {
    let mut term = run(20, 5, b"ab\x1b[2;3H");
    let before = Snapshot::from_terminal(&term);

    term.append(b"\x1b[3;10~").unwrap();

    assert_eq!(Snapshot::from_terminal(&term), before);
    // Parser is back in normal state
    term.append(b"Z").unwrap();
    assert_eq!(term.cell_at(1, 2).unwrap().ch, 'Z');
}

#[test]
fn test_split_sequences_across_appends() {
    let whole = run(20, 5, "\x1b[31mhé\x1b[2;3Hllo €".as_bytes());

    let bytes = "\x1b[31mhé\x1b[2;3Hllo €".as_bytes();
    let mut split = Terminal::new(20, 5, 100).unwrap();
    for b in bytes {
        split.append(std::slice::from_ref(b)).unwrap();
    }

    assert_eq!(
        Snapshot::from_terminal(&whole),
        Snapshot::from_terminal(&split)
    );
}

#[test]
fn test_broken_utf8_is_dropped() {
    let term = run(20, 1, b"a\xe2\x82b\xffc\x80d");
    assert_eq!(term.row_text(0).unwrap(), "abcd");
}

#[test]
fn test_osc_and_dcs_are_swallowed() {
    let term = run(
        20,
        1,
        b"\x1b]0;title\x07a\x1b]8;;http://x\x1b\\b\x1bPqdata\x1b\\c",
    );
    assert_eq!(term.row_text(0).unwrap(), "abc");
}

#[test]
fn test_huge_parameters_do_not_panic() {
    let term = run(
        10,
        5,
        b"\x1b[99999999;99999999H\x1b[99999L\x1b[99999@\x1b[99999S\x1b[65535;65535r",
    );
    assert_eq!(cursor(&term), (0, 0));
}

#[test]
fn test_charset_designation_not_printed() {
    let term = run(20, 1, b"\x1b(Bok\x1b)0");
    assert_eq!(term.row_text(0).unwrap(), "ok");
}

// ============================================================================
// Screens
// ============================================================================

#[test]
fn test_alternate_screen_round_trip() {
    let mut term = run(20, 5, b"\x1b[32mprimary\r\nline two");
    let before = Snapshot::from_terminal(&term);

    term.append(b"\x1b[?1049h\x1b[2J\x1b[Hfull screen app\x1b[0m")
        .unwrap();
    assert!(term.is_alternate_screen());
    assert_eq!(term.row_text(0).unwrap(), "full screen app");
    assert_eq!(term.primary_screen().line(0).unwrap().text(), "primary");

    term.append(b"\x1b[?1049l").unwrap();

    assert!(!term.is_alternate_screen());
    assert_eq!(Snapshot::from_terminal(&term), before);
    // Attributes of the primary screen survive too
    term.append(b"X").unwrap();
    assert_eq!(term.cell_at(1, 8).unwrap().fg, Color::GREEN);
}

#[test]
fn test_alternate_screen_keeps_its_content() {
    let term = run(20, 5, b"\x1b[?1047hone\x1b[?1047l\x1b[?1047h");
    assert_eq!(term.row_text(0).unwrap(), "one");
}

#[test]
fn test_cursor_save_restore_mode_1048() {
    let term = run(20, 5, b"\x1b[3;3H\x1b[?1048h\x1b[H\x1b[?1048l");
    assert_eq!(cursor(&term), (2, 2));
}

#[test]
fn test_reset_returns_to_primary() {
    let term = run(20, 5, b"text\x1b[?1049h\x1b[1malt\x1bc");
    assert!(!term.is_alternate_screen());
    assert_eq!(text(&term), "\n");
    assert_eq!(cursor(&term), (0, 0));
}

#[test]
fn test_resize_preserves_content() {
    let mut term = run(10, 3, b"abc\r\ndef");
    term.resize(5, 5).unwrap();
    assert_eq!(text(&term), "abc\ndef\n");
    term.append(b"\r\n\r\n\r\nxyz").unwrap();
    assert_eq!(cursor(&term), (4, 3));
}
