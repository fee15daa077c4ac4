use anyhow::{Context, Result};

use liquidplan::labware::WellName;

/// Print the wells `count` samples occupy, minus `skip`
pub fn run(count: usize, skip: Vec<String>) -> Result<()> {
    if !(1..=96).contains(&count) {
        anyhow::bail!("Sample count must be between 1 and 96, got {}", count);
    }

    let skip = skip
        .iter()
        .map(|s| s.parse::<WellName>().map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()
        .context("Invalid well in --skip")?;

    let wells: Vec<String> = WellName::first_n(count)
        .filter(|w| !skip.contains(w))
        .map(|w| w.to_string())
        .collect();

    println!("{} wells: {}", wells.len(), wells.join(" "));
    Ok(())
}
