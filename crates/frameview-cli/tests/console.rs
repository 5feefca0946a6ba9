//! Console sessions over an in-memory store.

use clap::ColorChoice;
use frameview_cli::console::{Console, Outcome};
use frameview_engine::Store;
use frameview_ingest::{IngestOptions, read_csv_str};
use frameview_model::Settings;

const PEOPLE: &str = "\
name,age,city
ann,45,Oslo
bob,22,Rome
cid,31,Oslo
dee,67,Lima
eve,19,Rome
";

fn console_with(settings: Settings) -> Console {
    let dataset = read_csv_str(PEOPLE, &IngestOptions::default()).expect("parse csv");
    let mut store = Store::new(settings);
    store.add("people", dataset).expect("add");
    Console::new(store, ColorChoice::Never)
}

fn console() -> Console {
    console_with(Settings::default())
}

fn output(console: &mut Console, line: &str) -> String {
    match console.run_line(line).expect(line) {
        Outcome::Output(text) => text,
        Outcome::Quit => panic!("unexpected quit on {line}"),
    }
}

fn run_script(console: &mut Console, script: &str, stop_on_error: bool) -> (String, bool) {
    let mut out = Vec::new();
    let ok = console.run(script.as_bytes(), &mut out, stop_on_error).is_ok();
    (String::from_utf8(out).expect("utf8"), ok)
}

#[test]
fn first_dataset_is_selected() {
    let console = console();
    assert_eq!(console.current(), Some("people"));
}

#[test]
fn empty_store_has_no_selection() {
    let mut console = Console::new(Store::new(Settings::default()), ColorChoice::Never);
    assert_eq!(console.current(), None);
    let error = console.run_line("show").unwrap_err();
    assert!(error.to_string().contains("no dataset selected"));
}

#[test]
fn filters_report_row_counts() {
    let mut console = console();
    assert_eq!(
        output(&mut console, "filter add age > 30"),
        "filter 0 added (3 of 5 rows)"
    );
    assert_eq!(
        output(&mut console, "filter add city == 'Oslo'"),
        "filter 1 added (2 of 5 rows)"
    );
    assert_eq!(
        output(&mut console, "filter toggle 0"),
        "filter 0 disabled (2 of 5 rows)"
    );
    assert_eq!(
        output(&mut console, "filter add nope == 1"),
        "filter 2 added, failed and skipped (2 of 5 rows)"
    );
    assert_eq!(
        output(&mut console, "filters"),
        "0: [ ] age > 30\n1: [x] city == 'Oslo'\n2: [!] nope == 1"
    );
    assert_eq!(
        output(&mut console, "filter remove 1"),
        "filter 1 removed: city == 'Oslo' (5 of 5 rows)"
    );
}

#[test]
fn sort_cycles_through_three_states() {
    let mut console = console();
    assert_eq!(output(&mut console, "sort age"), "sorted by age ▲ (5 of 5 rows)");
    assert_eq!(output(&mut console, "sort #1"), "sorted by age ▼ (5 of 5 rows)");
    assert_eq!(
        output(&mut console, "sort age"),
        "original order restored (5 of 5 rows)"
    );
    assert_eq!(
        output(&mut console, "sort-index index"),
        "sorted by index level 0 ▲ (5 of 5 rows)"
    );
}

#[test]
fn show_renders_table_and_footer() {
    let mut console = console();
    output(&mut console, "filter add city != 'Lima'");
    let text = output(&mut console, "show 2");
    assert!(text.contains("name"));
    assert!(text.contains("ann"));
    assert!(!text.contains("dee"));
    assert!(text.contains("people: 2 of 4 rows shown (5 total, 3 columns)"));
    assert!(text.contains("0: [x] city != 'Lima'"));
}

#[test]
fn edit_goes_through_the_view() {
    let mut console = console();
    output(&mut console, "sort age");
    // youngest first: eve is visible row 0
    assert_eq!(
        output(&mut console, "edit 0 name Eva"),
        "cell updated (5 of 5 rows)"
    );
    output(&mut console, "filter add name == 'Eva'");
    let text = output(&mut console, "show");
    assert!(text.contains("Eva"));
    assert!(text.contains("1 of 1 rows shown"));
}

#[test]
fn read_only_store_rejects_edits() {
    let mut console = console_with(Settings {
        editable: false,
        ..Settings::default()
    });
    let error = console.run_line("edit 0 age 1").unwrap_err();
    assert!(format!("{error:#}").contains("read-only"));
}

#[test]
fn unknown_column_is_an_error() {
    let mut console = console();
    let error = console.run_line("sort height").unwrap_err();
    assert!(error.to_string().contains("no column named 'height'"));
}

#[test]
fn script_stops_at_first_error() {
    let mut console = console();
    let (out, ok) = run_script(
        &mut console,
        "filter add age > 30\nsort nope\nfilter add city == 'Oslo'\n",
        true,
    );
    assert!(!ok);
    assert!(out.contains("filter 0 added (3 of 5 rows)"));
    let dataset = console.store().get("people").expect("dataset");
    assert_eq!(dataset.filters().len(), 1);
}

#[test]
fn interactive_run_continues_after_errors() {
    let mut console = console();
    let (out, ok) = run_script(
        &mut console,
        "# comment\nsort nope\nfilter add age > 30\nquit\nfilter add city == 'Oslo'\n",
        false,
    );
    assert!(ok);
    assert!(out.contains("error: no column named 'nope'"));
    assert!(out.contains("filter 0 added (3 of 5 rows)"));
    let dataset = console.store().get("people").expect("dataset");
    assert_eq!(dataset.filters().len(), 1);
}

#[test]
fn dump_lists_session_state() {
    let mut console = console();
    output(&mut console, "filter add age > 30");
    output(&mut console, "sort city");
    let dump = output(&mut console, "dump");
    assert!(dump.contains("\"name\": \"people\""));
    assert!(dump.contains("\"visible_rows\": 3"));
    assert!(dump.contains("age > 30"));
}

#[test]
fn datasets_and_use() {
    let mut console = console();
    assert!(output(&mut console, "datasets").contains("people"));
    assert!(console.run_line("use other").is_err());
    assert_eq!(output(&mut console, "use people"), "using people");
    assert_eq!(console.run_line("quit").expect("quit"), Outcome::Quit);
}
