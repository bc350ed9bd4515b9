#![allow(missing_docs, dead_code)]

use bstr::ByteSlice;
use gelstage::BString;

/// A short interactive session, cut mid-token at the seams the scanner has to
/// carry across feeds.
#[rustfmt::skip]
pub const STREAM: [&str; 14] = [
    "set x 1\npu",                    // statement ends mid-chunk
    "ts \"a;",                        // ';' inside a string
    "b\"; puts {\n  nested [li",      // string closes, brace opens
    "st 1 2]\n",                      // brackets balance inside braces
    "}",                              // closes the brace, newline still to come
    "\n# comment; with",              // ';' in a comment ends the statement
    " semicolon\n#",                  // '#' alone at the end of a chunk
    "{ braced\n   comment }\n",       // braced comment over two lines
    "set y [expr \\",                 // escape cut from the escaped newline
    "\n  1]\n",
    "puts a \\",                      // '\' cut from the '*' of a continuation
    "*\n",
    "  b\n\npu",                      // continuation ends, blank line dropped
    "ts last",                        // left pending
];

/// A literate document: prose with `>`-marked code lines.
pub const LITERATE: &str = "\
The session starts by binding a variable.
>set greeting hello
Then a procedure over several lines:
>proc greet {name} {
>    puts \"$greeting, $name\"
>}
Prose is dropped, even {unbalanced} prose {.
>greet world; greet there
>
Closing remark.
";

/// One statement per line: its index and its text with newlines escaped.
pub fn render(statements: &[BString]) -> String {
    statements
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{i}: {}", s.to_str_lossy().escape_debug()))
        .collect::<Vec<_>>()
        .join("\n")
}
