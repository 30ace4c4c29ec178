use std::fmt::Write;

use mailrotor_core::{AccountRecord, TIME_FORMAT};

/// Flat text dump kept for manual inspection. Never read back.
pub fn render(records: &[AccountRecord]) -> String {
    let rule = "=".repeat(50);
    let mut out = String::new();

    for acc in records {
        // Writing to a String cannot fail
        let _ = write!(
            out,
            "\n{rule}\nEmail: {}\nPassword: {}\nToken: {}\nUsage Limit: {}\nCreated Time: {}\nUsed: {}\n{rule}\n",
            acc.email,
            acc.password,
            acc.token,
            acc.usage_limit,
            acc.created_time.format(TIME_FORMAT),
            if acc.is_used() { "yes" } else { "no" },
        );
    }

    out
}
