use anyhow::{bail, Result};
use mailrotor_storage::AccountStore;

pub fn run(store: &AccountStore, output: &str) -> Result<()> {
    if !store.export_text(output) {
        bail!("export to {} failed", output);
    }
    println!("Exported {} accounts to {}", store.stats().total, output);
    Ok(())
}
