use anyhow::Result;
use mailrotor_core::config::AppConfig;
use mailrotor_core::TIME_FORMAT;
use mailrotor_rotation::FileSession;
use mailrotor_storage::AccountStore;

pub fn run(config: &AppConfig, store: &AccountStore) -> Result<()> {
    let stats = store.stats();
    let session = FileSession::new(&config.session.session_file).load()?;

    let active = session.identifier.as_deref().unwrap_or("-");
    let device = session.device_id.as_deref().unwrap_or("-");
    let updated = session
        .updated_time
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string());

    println!("\n╔══════════════════════════════════════════════╗");
    println!("║              MailRotor Status                ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║ Accounts:           {:>20}    ║", stats.total);
    println!("║ Used:               {:>20}    ║", stats.used);
    println!("║ Unused:             {:>20}    ║", stats.unused);
    println!("╠══════════════════════════════════════════════╣");
    println!("║ Active account:  {:>27} ║", truncate(active, 27));
    println!("║ Device id:       {:>27} ║", truncate(device, 27));
    println!("║ Switched at:     {:>27} ║", updated);
    println!("╚══════════════════════════════════════════════╝\n");

    Ok(())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_long_addresses_inside_the_box() {
        let email = "a-very-long-generated-address@disposable.example";
        assert_eq!(truncate(email, 27).chars().count(), 27);
        assert_eq!(truncate("short@mail.test", 27), "short@mail.test");
        assert_eq!(truncate("ééééé", 3), "ééé");
    }
}
