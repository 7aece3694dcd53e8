//! Built-in self checks behind the `--test` flag.
//!
//! A quick sanity pass over the CSV codec, usable from an installed binary
//! without a test harness. The same cases exist as proper unit tests in the
//! core crate.

use anyhow::{ensure, Result};
use smartifier_core::csv::{quote, split, unquote};

pub fn run() -> Result<()> {
    println!("Running self tests...");

    ensure!(quote("abc", '"') == "abc", "quote must not touch plain fields");
    ensure!(
        quote("a\"b\"c", '"') == "\"a\"\"b\"\"c\"",
        "quote must double interior quotes"
    );
    ensure!(quote("abc", 'a') == "aaabca", "quote with a letter quote char");
    ensure!(unquote("\"xyz\"", '"') == "xyz", "unquote wrapped field");
    ensure!(unquote("xyz", '"') == "xyz", "unquote plain field");
    ensure!(
        unquote("\"xy\"\"z\"", '"') == "xy\"z",
        "unquote doubled quote"
    );

    ensure!(split("a,b,c", ',', '"') == ["a", "b", "c"], "split plain");
    let v = split("\"a,b\",c", ',', '"');
    ensure!(v == ["\"a,b\"", "c"], "split quoted field");
    ensure!(unquote(&v[0], '"') == "a,b", "unquote split field");
    let v = split("\"a,\"\"b\",c", ',', '"');
    ensure!(v == ["\"a,\"\"b\"", "c"], "split doubled quote");
    ensure!(unquote(&v[0], '"') == "a,\"b", "unquote doubled quote field");
    let v = split("\"a\"x\"a\",b,c", ',', '"');
    ensure!(v.len() == 3, "split partially quoted field");
    ensure!(unquote(&v[0], '"') == "aa", "unquote partially quoted field");

    println!("Done.");
    Ok(())
}
