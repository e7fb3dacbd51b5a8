//! Tests for CLI vs TOML precedence rules.

use std::time::Duration;

use super::*;

mod cli_precedence {
    use super::*;

    #[test]
    fn cli_port_overrides_toml() {
        let cli = cli(&["--port", "4000"]);
        let toml = toml("[display]\nport = 5000");

        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

        assert_eq!(config.port, 4000);
    }

    #[test]
    fn cli_format_overrides_toml() {
        let cli = cli(&["--format", "text"]);
        let toml = toml("[display]\nformat = \"json\"");

        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

        assert_eq!(config.format, OutputFormat::Text);
    }

    #[test]
    fn cli_format_skips_invalid_toml_format() {
        let cli = cli(&["--format", "json"]);
        let toml = toml("[display]\nformat = \"yaml\"");

        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn cli_poll_interval_overrides_toml() {
        let cli = cli(&["--poll-interval", "10"]);
        let toml = toml("[monitor]\npoll_interval = 300");

        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

        assert_eq!(config.poll_interval, Duration::from_secs(10));
    }
}

mod toml_fallback {
    use super::*;

    #[test]
    fn toml_values_used_when_cli_silent() {
        let toml = toml(
            r#"
            [monitor]
            poll_interval = 120

            [display]
            port = 22
            format = "json"
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(config.port, 22);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.poll_interval, Duration::from_secs(120));
    }
}

mod boolean_flags {
    use super::*;

    #[test]
    fn toml_true_cannot_be_disabled_by_cli() {
        let toml = toml("[monitor]\nevents_only = true");

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert!(config.events_only);
    }

    #[test]
    fn cli_true_wins_over_toml_false() {
        let toml = toml("[monitor]\npoll_only = false");

        let config = ValidatedConfig::from_raw(&cli(&["--poll-only"]), Some(&toml)).unwrap();

        assert!(config.poll_only);
    }
}
