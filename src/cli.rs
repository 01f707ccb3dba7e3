//! Command-line interface definitions for the remote job crawler.
//!
//! Store credentials can come from flags, the environment, or a `.env`
//! file in the working directory.

use clap::{Parser, Subcommand};

/// # Examples
///
/// ```sh
/// # Crawl every configured board and upsert the results
/// remote_job_crawler crawl --config crawler.yaml
///
/// # Serve stored listings
/// remote_job_crawler serve --port 8000
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a crawler YAML config
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL", global = true, hide_env_values = true)]
    pub supabase_url: Option<String>,

    /// Supabase API key
    #[arg(long, env = "SUPABASE_KEY", global = true, hide_env_values = true)]
    pub supabase_key: Option<String>,

    /// Table holding the job listings
    #[arg(long, default_value = crate::gateway::JOBS_TABLE, global = true)]
    pub table: String,

    /// Defaults to `crawl`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scrape every configured board and save the listings
    #[command(alias = "crawlers")]
    Crawl,
    /// Serve stored listings over HTTP
    #[command(alias = "api")]
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["remote_job_crawler"]);
        assert_eq!(cli.command, None);
        assert_eq!(cli.table, "jobs");
    }

    #[test]
    fn test_crawl_with_config() {
        let cli = Cli::parse_from(["remote_job_crawler", "crawl", "-c", "crawler.yaml"]);
        assert_eq!(cli.command, Some(Command::Crawl));
        assert_eq!(cli.config.as_deref(), Some("crawler.yaml"));
    }

    #[test]
    fn test_serve_defaults_and_overrides() {
        let cli = Cli::parse_from(["remote_job_crawler", "serve"]);
        assert_eq!(
            cli.command,
            Some(Command::Serve {
                host: "127.0.0.1".to_string(),
                port: 8000
            })
        );

        let cli = Cli::parse_from([
            "remote_job_crawler",
            "serve",
            "--host",
            "0.0.0.0",
            "-p",
            "9000",
            "--table",
            "jobs_staging",
        ]);
        assert_eq!(
            cli.command,
            Some(Command::Serve {
                host: "0.0.0.0".to_string(),
                port: 9000
            })
        );
        assert_eq!(cli.table, "jobs_staging");
    }

    #[test]
    fn test_legacy_command_names() {
        let cli = Cli::parse_from(["remote_job_crawler", "crawlers"]);
        assert_eq!(cli.command, Some(Command::Crawl));

        let cli = Cli::parse_from(["remote_job_crawler", "api", "-p", "8080"]);
        assert_eq!(
            cli.command,
            Some(Command::Serve {
                host: "127.0.0.1".to_string(),
                port: 8080
            })
        );
    }

    #[test]
    fn test_store_flags() {
        let cli = Cli::parse_from([
            "remote_job_crawler",
            "--supabase-url",
            "https://abc.supabase.co",
            "--supabase-key",
            "k",
        ]);
        assert_eq!(cli.supabase_url.as_deref(), Some("https://abc.supabase.co"));
        assert_eq!(cli.supabase_key.as_deref(), Some("k"));
    }
}
