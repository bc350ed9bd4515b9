#![expect(missing_docs)]

mod common;

use std::io::{self, Read};

use gelstage::{History, LiterateOptions, LiterateReader, Scanner, Selection};
use regex::bytes::Regex;

use crate::common::{LITERATE, render};

fn load_literate(doc: &str, scratch_capacity: usize) -> History {
    let reader = LiterateReader::with_options(
        doc.as_bytes(),
        LiterateOptions {
            scratch_capacity,
            ..Default::default()
        },
    );
    let mut history = History::new();
    history.load(reader).unwrap();
    history
}

#[test]
fn literate_document_into_history() {
    let history = load_literate(LITERATE, 128);
    insta::assert_snapshot!(render(history.entries()), @r#"
    0: set greeting hello\n
    1: proc greet {name} {\n    puts \"$greeting, $name\"\n}\n
    2: greet world;
    3:  greet there\n
    "#);

    // prose braces never reach the scanner
    for capacity in [1, 3, 17] {
        assert_eq!(load_literate(LITERATE, capacity), history);
    }
}

#[test]
fn brief_listing() {
    let history = load_literate(LITERATE, 128);
    let listing: Vec<String> = history
        .brief()
        .map(|(i, line)| format!("{i}: {line}"))
        .collect();
    insta::assert_snapshot!(listing.join("\n"), @r"
    0: set greeting hello
    1: proc greet {name} {...
    2: greet world;
    3:  greet there
    ");
}

#[test]
fn search_and_replay() {
    let mut history = load_literate(LITERATE, 128);
    let calls = Regex::new(r"^\s*greet ").unwrap();
    let hits: Vec<usize> = history.search(&calls).into_iter().map(|(i, _)| i).collect();
    assert_eq!(hits, [2, 3]);

    // replaying a span feeds the same statements back through a scanner
    let mut scanner = Scanner::new();
    for entry in history.select(Selection::span(2, 3)).unwrap() {
        scanner.feed(entry);
    }
    assert_eq!(scanner.take_completed(), history.select(Selection::span(2, 3)).unwrap());

    let cut = history.cut(Selection::one(0)).unwrap();
    assert_eq!(cut, ["set greeting hello\n"]);
    assert_eq!(history.len(), 3);
}

#[test]
fn save_then_load_literate_session() {
    let history = load_literate(LITERATE, 128);
    let mut saved = Vec::new();
    history.save(&mut saved).unwrap();
    assert_eq!(
        saved,
        b"set greeting hello\nproc greet {name} {\n    puts \"$greeting, $name\"\n}\ngreet world; greet there\n"
    );

    let mut reloaded = History::new();
    assert_eq!(reloaded.load(saved.as_slice()).unwrap(), 4);
    assert_eq!(reloaded, history);
}

#[test]
fn filtered_source_reads_like_a_plain_file() {
    let mut code = String::new();
    LiterateReader::new(LITERATE.as_bytes())
        .read_to_string(&mut code)
        .unwrap();
    insta::assert_snapshot!(code, @r#"
    set greeting hello
    proc greet {name} {
        puts "$greeting, $name"
    }
    greet world; greet there
    "#);
}

#[test]
fn load_stops_on_source_failure() {
    struct Broken;
    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "no access"))
        }
    }

    let mut history = History::new();
    let err = history.load(LiterateReader::new(Broken)).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    assert!(err.to_string().contains("no access"));
    assert!(history.is_empty());
}
