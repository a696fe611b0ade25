//! `tapedeck info <page> --url <u>` – metadata the options dialog would show.

use anyhow::Result;
use tapedeck_core::metadata::MetadataExtractor;

use super::load_page;
use crate::cli::PageArgs;

pub fn run_info(args: &PageArgs) -> Result<()> {
    let (site, doc) = load_page(args)?;
    let metadata = MetadataExtractor::new(site)?.extract(&doc);
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}
