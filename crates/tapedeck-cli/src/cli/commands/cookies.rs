//! `tapedeck cookies --url <u> [--cookie <c>]` – Netscape cookie container.

use anyhow::Result;
use tapedeck_core::cookies;

use super::parse_location;

pub fn run_cookies(url: &str, cookie: &str) -> Result<()> {
    let location = parse_location(url)?;
    let export = cookies::export(&location, cookie);
    print!("{}", export.text);
    eprintln!("{} cookie record(s)", export.records);
    Ok(())
}
