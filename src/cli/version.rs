//! Version command handler

/// Version banner shown by `launchdeck version`
pub fn version_text() -> String {
    format!(
        "launchdeck {}\n  {}\n  License: {}",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_LICENSE"),
    )
}

/// Display version information
pub fn display_version() {
    println!("{}", version_text());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_text_starts_with_name() {
        assert!(version_text().starts_with(concat!("launchdeck ", env!("CARGO_PKG_VERSION"))));
    }
}
