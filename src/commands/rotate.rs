use std::sync::Arc;

use anyhow::{bail, Result};
use mailrotor_core::config::AppConfig;
use mailrotor_rotation::{select_from, AccountRotator, ActivationApplier, FileSession, RotationOutcome, Selection};
use mailrotor_storage::AccountStore;

fn describe(selection: &Selection) -> String {
    match selection {
        Selection::Unused(acc) => format!("{} (unused)", acc.email),
        Selection::Next { current, next } => format!("{} (after {})", next.email, current.email),
        Selection::ColdStart(acc) => format!("{} (no usage history, starting over)", acc.email),
        Selection::Exhausted { current } => format!("none: every account after {} is used", current.email),
        Selection::UnknownCurrent(email) => format!("none: {} is not in the store", email),
        Selection::Empty => "none: the store is empty".to_string(),
    }
}

pub fn preview(store: &AccountStore, after: Option<&str>) {
    let selection = select_from(&store.load(), after);
    println!("Next account: {}", describe(&selection));
}

pub async fn select(config: &AppConfig, store: &AccountStore, after: Option<&str>) -> Result<()> {
    let session = Arc::new(FileSession::new(&config.session.session_file));
    let applier = ActivationApplier::new(session.clone(), session.clone(), store.clone());
    let rotator = AccountRotator::new(store.clone(), applier);

    match rotator.rotate_from(after).await {
        RotationOutcome::Applied { selection, .. } => {
            println!("Switched to {}", describe(&selection));
            println!("Session file: {}", session.path().display());
            let stats = rotator.stats();
            println!("{} of {} accounts still unused", stats.unused, stats.total);
            Ok(())
        }
        RotationOutcome::ApplyFailed { account } => {
            bail!("could not activate {}; it stays available for the next rotation", account.email)
        }
        RotationOutcome::NoAccount(selection) => bail!("no account selected: {}", describe(&selection)),
    }
}
