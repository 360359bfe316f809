use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use argline_cli::line_editor::{
    EditorState, History, ScriptedKeys, Terminal, VirtualTerminal, WrapMode,
};
use argline_core::error::Error;
use crossterm::event::{KeyCode, KeyModifiers};
use pretty_assertions::assert_eq;

const MODES: [WrapMode; 2] = [WrapMode::Eager, WrapMode::Deferred];

fn setup(cols: u16, rows: u16, mode: WrapMode, keys: ScriptedKeys) -> (Terminal<VirtualTerminal>, VirtualTerminal) {
    let screen = VirtualTerminal::new(cols, rows, mode);
    let terminal = Terminal::new(screen.clone(), keys).with_poll_interval(Duration::ZERO);
    (terminal, screen)
}

/// Types `text` one key at a time, checking after every key that the cursor
/// sits at the column sum of everything before it.
fn typing_with_cursor_checks(screen: &VirtualTerminal, prompt: &str, text: &str, cols: usize) -> ScriptedKeys {
    let mut keys = ScriptedKeys::new();
    let mut typed = 0;
    for c in text.chars() {
        typed += 1;
        let expected = prompt.len() + typed;
        let screen = screen.clone();
        keys = keys.text(&c.to_string()).run(move || {
            let (col, _) = screen.cursor_position();
            assert_eq!(usize::from(col), expected % cols, "after {expected} columns");
        });
    }
    keys
}

#[test]
fn test_read_string_commits_line() {
    for mode in MODES {
        let keys = ScriptedKeys::new().text("hello").enter();
        let (mut terminal, screen) = setup(20, 5, mode, keys);

        assert_eq!(terminal.read_string("> ").unwrap(), "hello");
        assert_eq!(screen.lines(), vec!["> hello"]);
        assert_eq!(screen.cursor_position(), (0, 1));
        assert_eq!(terminal.history(), vec!["hello"]);
        assert_eq!(terminal.state(), EditorState::Idle);
        assert!(!screen.is_raw());
        assert!(screen.is_cursor_visible());
    }
}

#[test]
fn test_cursor_follows_column_sum_across_wraps() {
    let text = "abcdefghijklmnopqrstuvwxyz";
    for mode in MODES {
        let screen = VirtualTerminal::new(10, 3, mode);
        let keys = typing_with_cursor_checks(&screen, "> ", text, 10).enter();
        let mut terminal = Terminal::new(screen.clone(), keys).with_poll_interval(Duration::ZERO);

        assert_eq!(terminal.read_string("> ").unwrap(), text);
        assert_eq!(
            screen.lines(),
            vec!["> abcdefgh", "ijklmnopqr", "stuvwxyz"],
            "{mode:?}"
        );
    }
}

#[test]
fn test_line_filling_exact_rows_scrolls() {
    let text = "abcdefghijklmnopqrstuvwxyz0123";
    for mode in MODES {
        let keys = ScriptedKeys::new().text(text).enter();
        let (mut terminal, screen) = setup(8, 3, mode, keys);

        assert_eq!(terminal.read_string("> ").unwrap(), text);
        assert_eq!(
            screen.lines(),
            vec!["> abcdef", "ghijklmn", "opqrstuv", "wxyz0123"],
            "{mode:?}"
        );
        assert_eq!(screen.cursor_position(), (0, 2));
    }
}

#[test]
fn test_wide_characters_wrap_before_last_column() {
    for mode in MODES {
        let screen = VirtualTerminal::new(9, 4, mode);
        let check = screen.clone();
        let keys = ScriptedKeys::new()
            .text("한한한한")
            .run(move || assert_eq!(check.cursor_position(), (2, 1)))
            .enter();
        let mut terminal = Terminal::new(screen.clone(), keys).with_poll_interval(Duration::ZERO);

        assert_eq!(terminal.read_string("> ").unwrap(), "한한한한");
        assert_eq!(screen.lines(), vec!["> 한한한", "한"], "{mode:?}");
    }
}

#[test]
fn test_cursor_movement_and_deletion() {
    let keys = ScriptedKeys::new()
        .text("helo")
        .key(KeyCode::Left)
        .text("l")
        .key(KeyCode::Home)
        .key(KeyCode::Delete)
        .text("H")
        .key(KeyCode::End)
        .text(" world")
        .key(KeyCode::Backspace)
        .text("D")
        .enter();
    let (mut terminal, screen) = setup(40, 5, WrapMode::Deferred, keys);

    assert_eq!(terminal.read_string("$ ").unwrap(), "Hello worlD");
    assert_eq!(screen.lines(), vec!["$ Hello worlD"]);
}

#[test]
fn test_delete_to_home_and_end() {
    let keys = ScriptedKeys::new()
        .text("one two three")
        .key(KeyCode::Left)
        .key(KeyCode::Left)
        .key(KeyCode::Left)
        .key(KeyCode::Left)
        .key(KeyCode::Left)
        .ctrl('k')
        .ctrl('a')
        .key(KeyCode::Right)
        .key(KeyCode::Right)
        .key(KeyCode::Right)
        .ctrl('u')
        .enter();
    let (mut terminal, _screen) = setup(40, 5, WrapMode::Eager, keys);

    assert_eq!(terminal.read_string("> ").unwrap(), " two ");
}

#[test]
fn test_escape_clears_input() {
    let keys = ScriptedKeys::new()
        .text("discard me")
        .key(KeyCode::Esc)
        .text("keep")
        .enter();
    let (mut terminal, screen) = setup(40, 5, WrapMode::Eager, keys);

    assert_eq!(terminal.read_string("> ").unwrap(), "keep");
    assert_eq!(screen.lines(), vec!["> keep"]);
}

#[test]
fn test_default_text_is_editable() {
    let keys = ScriptedKeys::new().key(KeyCode::Backspace).text("X").enter();
    let (mut terminal, _screen) = setup(40, 5, WrapMode::Eager, keys);

    assert_eq!(terminal.read_string_with("> ", "abc", false).unwrap(), "abX");
}

#[test]
fn test_history_browsing() {
    let history = || History::with_entries(vec!["first".to_string(), "second".to_string()], None);

    let cases: Vec<(ScriptedKeys, &str)> = vec![
        (ScriptedKeys::new().key(KeyCode::Up).enter(), "second"),
        (ScriptedKeys::new().key(KeyCode::Up).key(KeyCode::Up).enter(), "first"),
        (
            ScriptedKeys::new()
                .key(KeyCode::Up)
                .key(KeyCode::Up)
                .key(KeyCode::Up)
                .key(KeyCode::Down)
                .enter(),
            "second",
        ),
        (ScriptedKeys::new().text("typed").key(KeyCode::Down).enter(), "typed"),
    ];

    for (keys, expected) in cases {
        let (terminal, _screen) = setup(40, 5, WrapMode::Eager, keys);
        let mut terminal = terminal.with_history(history());
        assert_eq!(terminal.read_string("> ").unwrap(), expected);
    }
}

#[test]
fn test_history_deduplicates_committed_lines() {
    let keys = ScriptedKeys::new()
        .text("a")
        .enter()
        .text("b")
        .enter()
        .text("a")
        .enter()
        .text("  ")
        .ctrl('u')
        .enter();
    let (mut terminal, _screen) = setup(40, 6, WrapMode::Eager, keys);

    for _ in 0..4 {
        terminal.read_string("> ").unwrap();
    }
    assert_eq!(terminal.history(), vec!["b", "a"]);
}

#[test]
fn test_single_history_entry_is_reselected() {
    let keys = ScriptedKeys::new()
        .key(KeyCode::Up)
        .key(KeyCode::Up)
        .enter();
    let (terminal, _screen) = setup(40, 5, WrapMode::Eager, keys);
    let mut terminal = terminal.with_history(History::with_entries(vec!["only".to_string()], None));

    assert_eq!(terminal.read_string("> ").unwrap(), "only");
}

#[test]
fn test_completion_cycles_forward_and_back() {
    let candidates = |_context: &[String], _fragment: &str| {
        vec!["lsblk".to_string(), "lock".to_string(), "ls".to_string()]
    };

    let cases: Vec<(ScriptedKeys, &str)> = vec![
        (ScriptedKeys::new().text("l").key(KeyCode::Tab).enter(), "lock"),
        (
            ScriptedKeys::new()
                .text("l")
                .key(KeyCode::Tab)
                .key(KeyCode::Tab)
                .key(KeyCode::Tab)
                .enter(),
            "lsblk",
        ),
        (
            ScriptedKeys::new()
                .text("l")
                .key(KeyCode::Tab)
                .key(KeyCode::Tab)
                .key(KeyCode::Tab)
                .key(KeyCode::Tab)
                .enter(),
            "lock",
        ),
        (ScriptedKeys::new().text("l").key(KeyCode::BackTab).enter(), "lsblk"),
        (ScriptedKeys::new().text("ls").key(KeyCode::Tab).enter(), "lsblk"),
        (
            ScriptedKeys::new()
                .text("ls")
                .key(KeyCode::Tab)
                .key(KeyCode::Tab)
                .enter(),
            "ls",
        ),
        (
            ScriptedKeys::new()
                .text("l")
                .key(KeyCode::Tab)
                .text("s")
                .key(KeyCode::Tab)
                .enter(),
            "locks",
        ),
        (ScriptedKeys::new().text("x").key(KeyCode::Tab).enter(), "x"),
    ];

    for (keys, expected) in cases {
        let (terminal, _screen) = setup(40, 5, WrapMode::Eager, keys);
        let mut terminal = terminal.with_completer(candidates);
        assert_eq!(terminal.read_string("> ").unwrap(), expected);
    }
}

#[test]
fn test_completion_gets_context_and_keeps_suffix() {
    let completer = |context: &[String], fragment: &str| {
        assert_eq!(context, ["git".to_string()]);
        assert_eq!(fragment, "ch");
        vec!["checkout".to_string(), "cherry-pick".to_string(), "push".to_string()]
    };
    let keys = ScriptedKeys::new()
        .text("git ch main")
        .key(KeyCode::Left)
        .key(KeyCode::Left)
        .key(KeyCode::Left)
        .key(KeyCode::Left)
        .key(KeyCode::Left)
        .key(KeyCode::Tab)
        .enter();
    let (terminal, screen) = setup(40, 5, WrapMode::Deferred, keys);
    let mut terminal = terminal.with_completer(completer);

    assert_eq!(terminal.read_string("> ").unwrap(), "git checkout main");
    assert_eq!(screen.lines(), vec!["> git checkout main"]);
}

#[test]
fn test_completion_requotes_quoted_fragment() {
    let completer = |_context: &[String], _fragment: &str| {
        vec!["my file.txt".to_string(), "notes".to_string()]
    };
    let keys = ScriptedKeys::new().text("cat \"my").key(KeyCode::Tab).enter();
    let (terminal, _screen) = setup(40, 5, WrapMode::Eager, keys);
    let mut terminal = terminal.with_completer(completer);

    assert_eq!(terminal.read_string("> ").unwrap(), "cat \"my file.txt\"");
}

#[test]
fn test_completion_quotes_candidates_with_spaces() {
    let completer = |_context: &[String], _fragment: &str| vec!["my file.txt".to_string()];
    let keys = ScriptedKeys::new().text("cat m").key(KeyCode::Tab).enter();
    let (terminal, _screen) = setup(40, 5, WrapMode::Eager, keys);
    let mut terminal = terminal.with_completer(completer);

    assert_eq!(terminal.read_string("> ").unwrap(), "cat \"my file.txt\"");
}

#[test]
fn test_hidden_input_is_not_echoed_or_recorded() {
    for mode in MODES {
        let keys = ScriptedKeys::new().text("hunter2").enter();
        let (mut terminal, screen) = setup(20, 5, mode, keys);

        assert_eq!(terminal.read_secret("password: ").unwrap(), "hunter2");
        assert_eq!(screen.lines(), vec!["password:"]);
        assert!(terminal.history().is_empty());
    }
}

#[test]
fn test_read_long_filters_keys() {
    let keys = ScriptedKeys::new().text("1a2").enter();
    let (mut terminal, screen) = setup(20, 5, WrapMode::Eager, keys);
    assert_eq!(terminal.read_long("n: ", None).unwrap(), Some(12));
    assert_eq!(screen.lines(), vec!["n: 12"]);
    assert!(terminal.history().is_empty());

    let keys = ScriptedKeys::new().text("-x5").enter();
    let (mut terminal, _screen) = setup(20, 5, WrapMode::Eager, keys);
    assert_eq!(terminal.read_long("n: ", None).unwrap(), Some(-5));

    let keys = ScriptedKeys::new().enter();
    let (mut terminal, _screen) = setup(20, 5, WrapMode::Eager, keys);
    assert_eq!(terminal.read_long("n: ", None).unwrap(), None);
}

#[test]
fn test_read_long_default_placeholder() {
    let keys = ScriptedKeys::new().enter();
    let (mut terminal, _screen) = setup(20, 5, WrapMode::Eager, keys);
    assert_eq!(terminal.read_long("n: ", Some(42)).unwrap(), Some(42));

    let keys = ScriptedKeys::new().text("x").key(KeyCode::Backspace).text("7").enter();
    let (mut terminal, _screen) = setup(20, 5, WrapMode::Eager, keys);
    assert_eq!(terminal.read_long("n: ", Some(42)).unwrap(), Some(47));
}

#[test]
fn test_read_double_accepts_partial_numbers() {
    let keys = ScriptedKeys::new().text("3.x5e-1").enter();
    let (mut terminal, _screen) = setup(20, 5, WrapMode::Eager, keys);
    let value = terminal.read_double("x: ", None).unwrap().unwrap();
    assert!((value - 0.35).abs() < 1e-9);
}

#[test]
fn test_numeric_reads_wait_for_a_complete_number() {
    let keys = ScriptedKeys::new().text("-").enter().text("3").enter();
    let (mut terminal, screen) = setup(20, 5, WrapMode::Eager, keys);
    assert_eq!(terminal.read_long("n: ", None).unwrap(), Some(-3));
    assert_eq!(screen.lines(), vec!["n: -3"]);

    let keys = ScriptedKeys::new().text("1e").enter().text("2").enter();
    let (mut terminal, _screen) = setup(20, 5, WrapMode::Eager, keys);
    assert_eq!(terminal.read_double("x: ", None).unwrap(), Some(100.0));

    let keys = ScriptedKeys::new().text("3.").enter();
    let (mut terminal, _screen) = setup(20, 5, WrapMode::Eager, keys);
    assert_eq!(terminal.read_double("x: ", None).unwrap(), Some(3.0));
}

#[test]
fn test_ctrl_c_cancels_read() {
    for mode in MODES {
        let cancelled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&cancelled);
        let keys = ScriptedKeys::new().text("abc").ctrl('c');
        let (terminal, screen) = setup(20, 5, mode, keys);
        let mut terminal = terminal.on_cancelled(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(matches!(terminal.read_string("> "), Err(Error::ReadCancelled)));
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
        assert_eq!(terminal.state(), EditorState::Idle);
        assert!(!screen.is_raw());
        assert!(terminal.history().is_empty());
    }
}

#[test]
fn test_ctrl_c_can_be_suppressed() {
    let keys = ScriptedKeys::new().text("a").ctrl('c').text("b").enter();
    let (terminal, _screen) = setup(20, 5, WrapMode::Eager, keys);
    let mut terminal = terminal.on_cancel_key_press(|| true);

    assert_eq!(terminal.read_string("> ").unwrap(), "ab");
}

#[test]
fn test_cancel_handle_stops_read_and_resets() {
    let screen = VirtualTerminal::new(20, 5, WrapMode::Eager);
    let handle_slot: Arc<std::sync::Mutex<Option<argline_cli::line_editor::CancelHandle>>> =
        Arc::default();
    let slot = Arc::clone(&handle_slot);
    let keys = ScriptedKeys::new()
        .text("ab")
        .run(move || {
            if let Some(handle) = slot.lock().unwrap().as_ref() {
                handle.cancel();
            }
        })
        .idle()
        .text("ok")
        .enter();
    let mut terminal = Terminal::new(screen.clone(), keys).with_poll_interval(Duration::ZERO);
    *handle_slot.lock().unwrap() = Some(terminal.cancel_handle());

    assert!(matches!(terminal.read_string("> "), Err(Error::ReadCancelled)));
    assert!(terminal.cancel_handle().is_cancelled());
    assert_eq!(terminal.read_string("> ").unwrap(), "ok");
    assert!(!terminal.cancel_handle().is_cancelled());
}

#[test]
fn test_exhausted_input_releases_editor() {
    let keys = ScriptedKeys::new().text("abc");
    let (mut terminal, screen) = setup(20, 5, WrapMode::Eager, keys);

    assert!(matches!(terminal.read_string("> "), Err(Error::Stdio(_))));
    assert_eq!(terminal.state(), EditorState::Idle);
    assert!(!screen.is_raw());
    assert_eq!(screen.cursor_position(), (0, 1));
}

#[test]
fn test_read_key_waits_for_filtered_key() {
    let keys = ScriptedKeys::new()
        .text("x")
        .key_with(KeyCode::Char('y'), KeyModifiers::NONE)
        .enter();
    let (mut terminal, screen) = setup(20, 5, WrapMode::Eager, keys);

    let key = terminal.read_key("Continue? ", &[KeyCode::Enter, KeyCode::Char('y')]).unwrap();
    assert_eq!(key.code, KeyCode::Char('y'));
    assert_eq!(screen.lines(), vec!["Continue?"]);
}

#[test]
fn test_shared_writer_output_appears_above_input() {
    for mode in MODES {
        let screen = VirtualTerminal::new(30, 6, mode);
        let writer_slot: Arc<std::sync::Mutex<Option<argline_cli::line_editor::SharedWriter<VirtualTerminal>>>> =
            Arc::default();
        let slot = Arc::clone(&writer_slot);
        let check = screen.clone();
        let keys = ScriptedKeys::new()
            .text("abc")
            .run(move || {
                let mut writer = slot.lock().unwrap().take().unwrap();
                writer.write_all(b"log line\n").unwrap();
                writer.write_all(b"par").unwrap();
                writer.write_all(b"tial\n").unwrap();
                writer.write_all(b"no newline").unwrap();
                assert_eq!(check.cursor_position(), (5, 3));
            })
            .text("d")
            .enter();
        let mut terminal = Terminal::new(screen.clone(), keys).with_poll_interval(Duration::ZERO);
        *writer_slot.lock().unwrap() = Some(terminal.shared_writer());

        assert_eq!(terminal.read_string("> ").unwrap(), "abcd");
        assert_eq!(
            screen.lines(),
            vec!["log line", "partial", "no newline", "> abcd"],
            "{mode:?}"
        );
    }
}

/// Reads "ab" on a 10 column screen while `writes` go through the shared
/// writer, returning the screen afterwards.
fn lines_after_foreign_writes(mode: WrapMode, writes: &'static [&'static str]) -> Vec<String> {
    let screen = VirtualTerminal::new(10, 6, mode);
    let writer_slot: Arc<std::sync::Mutex<Option<argline_cli::line_editor::SharedWriter<VirtualTerminal>>>> =
        Arc::default();
    let slot = Arc::clone(&writer_slot);
    let keys = ScriptedKeys::new()
        .text("ab")
        .run(move || {
            let mut writer = slot.lock().unwrap().take().unwrap();
            for text in writes {
                writer.write_all(text.as_bytes()).unwrap();
            }
        })
        .enter();
    let mut terminal = Terminal::new(screen.clone(), keys).with_poll_interval(Duration::ZERO);
    *writer_slot.lock().unwrap() = Some(terminal.shared_writer());

    assert_eq!(terminal.read_string("> ").unwrap(), "ab");
    screen.lines()
}

#[test]
fn test_foreign_line_filling_the_row_is_kept() {
    for mode in MODES {
        assert_eq!(
            lines_after_foreign_writes(mode, &["0123456789", "X\n"]),
            vec!["0123456789", "X", "> ab"],
            "{mode:?}"
        );
        assert_eq!(
            lines_after_foreign_writes(mode, &["012345678", "9"]),
            vec!["0123456789", "> ab"],
            "{mode:?}"
        );
        assert_eq!(
            lines_after_foreign_writes(mode, &["01234", "567\n"]),
            vec!["01234567", "> ab"],
            "{mode:?}"
        );
    }
}

#[test]
fn test_shared_writer_from_another_thread() {
    let screen = VirtualTerminal::new(30, 6, WrapMode::Deferred);
    let writer_slot: Arc<std::sync::Mutex<Option<argline_cli::line_editor::SharedWriter<VirtualTerminal>>>> =
        Arc::default();
    let slot = Arc::clone(&writer_slot);
    let keys = ScriptedKeys::new()
        .text("typed")
        .run(move || {
            let mut writer = slot.lock().unwrap().take().unwrap();
            thread::spawn(move || writer.write_all("tick 한\n".as_bytes()).unwrap())
                .join()
                .unwrap();
        })
        .enter();
    let mut terminal = Terminal::new(screen.clone(), keys).with_poll_interval(Duration::ZERO);
    *writer_slot.lock().unwrap() = Some(terminal.shared_writer());

    assert_eq!(terminal.read_string("$ ").unwrap(), "typed");
    assert_eq!(screen.lines(), vec!["tick 한", "$ typed"]);
}

#[test]
fn test_shared_writer_writes_through_when_idle() {
    let keys = ScriptedKeys::new().text("x").enter();
    let (mut terminal, screen) = setup(20, 5, WrapMode::Eager, keys);
    let mut writer = terminal.shared_writer();

    let bytes = "한 before\n".as_bytes();
    writer.write_all(&bytes[..1]).unwrap();
    writer.write_all(&bytes[1..]).unwrap();
    assert_eq!(screen.cursor_position(), (0, 1));

    assert_eq!(terminal.read_string("> ").unwrap(), "x");
    writer.write_all(b"after\n").unwrap();
    assert_eq!(screen.lines(), vec!["한 before", "> x", "after"]);
}

#[test]
fn test_set_prompt_while_reading() {
    let screen = VirtualTerminal::new(30, 5, WrapMode::Eager);
    let keys_screen = screen.clone();
    let handle_slot: Arc<std::sync::Mutex<Option<argline_cli::line_editor::PromptHandle<VirtualTerminal>>>> =
        Arc::default();
    let slot = Arc::clone(&handle_slot);
    let keys = ScriptedKeys::new()
        .text("ab")
        .key(KeyCode::Left)
        .run(move || {
            let handle = slot.lock().unwrap().take().unwrap();
            handle.set_prompt("longer prompt> ").unwrap();
            assert_eq!(keys_screen.row_text(0), "longer prompt> ab");
            assert_eq!(keys_screen.cursor_position(), (16, 0));
        })
        .text("X")
        .enter();
    let mut terminal = Terminal::new(screen.clone(), keys).with_poll_interval(Duration::ZERO);
    *handle_slot.lock().unwrap() = Some(terminal.prompt_handle());

    assert!(matches!(terminal.set_prompt("idle> "), Err(Error::NotReading)));
    assert_eq!(terminal.read_string("> ").unwrap(), "aXb");
    assert_eq!(screen.lines(), vec!["longer prompt> aXb"]);
}

#[test]
fn test_consecutive_reads_start_on_fresh_rows() {
    for mode in MODES {
        let keys = ScriptedKeys::new().text("one").enter().text("two").enter();
        let (mut terminal, screen) = setup(20, 5, mode, keys);

        assert_eq!(terminal.read_string("> ").unwrap(), "one");
        assert_eq!(terminal.read_string(">> ").unwrap(), "two");
        assert_eq!(screen.lines(), vec!["> one", ">> two"]);
    }
}
