use super::Catalog;
use anyhow::Result;

pub fn print_json(catalog: &Catalog) -> Result<()> {
    let json = serde_json::to_string_pretty(catalog)?;
    println!("{}", json);
    Ok(())
}
