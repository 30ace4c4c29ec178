use anyhow::Result;
use mailrotor_core::TIME_FORMAT;
use mailrotor_storage::AccountStore;

pub fn list(store: &AccountStore) {
    let records = store.load();
    if records.is_empty() {
        println!("No accounts in {}", store.path().display());
        return;
    }

    println!("{:>3}  {:<40} {:<5} {:<10} {}", "#", "Email", "Used", "Quota", "Last used");
    for (i, acc) in records.iter().enumerate() {
        let last_used = acc
            .status
            .last_used_time
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}  {:<40} {:<5} {:<10} {}",
            i + 1,
            acc.email,
            if acc.is_used() { "yes" } else { "no" },
            acc.usage_limit,
            last_used
        );
    }
}

pub fn add(store: &AccountStore, email: &str, password: &str, token: &str, quota: &str) -> Result<()> {
    let record = store.insert(email, password, token, quota)?;
    println!("Added {} ({} accounts total)", record.email, store.stats().total);
    Ok(())
}

pub fn mark_used(store: &AccountStore, email: &str) -> Result<()> {
    let record = store.try_mark_used(email)?;
    let when = record
        .status
        .last_used_time
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_default();
    println!("Marked {} as used at {}", record.email, when);
    Ok(())
}
