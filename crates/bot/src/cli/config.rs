//! `conversationbot config validate|show`.

use cb_domain::config::{Config, ConfigError, ConfigSeverity};

/// Print the validation report.  Returns `true` when the config is usable
/// (warnings alone do not fail it).
pub fn validate(config: &Config, config_path: &str) -> bool {
    let (report, usable) = render_report(&config.validate(), config_path);
    print!("{report}");
    usable
}

/// Errors are listed before warnings, followed by a one-line verdict.
fn render_report(issues: &[ConfigError], config_path: &str) -> (String, bool) {
    let (errors, warnings): (Vec<&ConfigError>, Vec<&ConfigError>) = issues
        .iter()
        .partition(|issue| issue.severity == ConfigSeverity::Error);

    let mut out = String::new();
    for issue in errors.iter().chain(&warnings) {
        out.push_str(&format!("{issue}\n"));
    }

    let verdict = match (errors.len(), warnings.len()) {
        (0, 0) => format!("{config_path}: ok\n"),
        (0, w) => format!("{config_path}: usable, {w} warning(s)\n"),
        (e, w) => format!("{config_path}: {e} error(s), {w} warning(s)\n"),
    };
    out.push_str(&verdict);

    (out, errors.is_empty())
}

/// Print the effective config, defaults included, as TOML.
pub fn show(config: &Config) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| anyhow::anyhow!("rendering config as TOML: {e}"))?;
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_reports_ok() {
        let (report, usable) = render_report(&Config::default().validate(), "config.toml");
        assert!(usable);
        assert_eq!(report, "config.toml: ok\n");
    }

    #[test]
    fn errors_come_before_warnings_and_fail() {
        let mut config = Config::default();
        config.storage.atomic_writes = false;
        config.dispatch.max_in_flight = 0;

        let (report, usable) = render_report(&config.validate(), "bot.toml");
        assert!(!usable);

        let lines: Vec<&str> = report.lines().collect();
        assert!(lines[0].starts_with("[ERROR] dispatch.max_in_flight"));
        assert!(lines[1].starts_with("[WARN] storage.atomic_writes"));
        assert_eq!(lines[2], "bot.toml: 1 error(s), 1 warning(s)");
    }

    #[test]
    fn warnings_alone_are_usable() {
        let mut config = Config::default();
        config.storage.atomic_writes = false;
        let (report, usable) = render_report(&config.validate(), "c.toml");
        assert!(usable);
        assert!(report.ends_with("c.toml: usable, 1 warning(s)\n"));
    }
}
