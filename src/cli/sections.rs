//! `homeport sections` — manage sections on a running server.

use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct SectionsArgs {
    /// Server URL
    #[arg(long, default_value = "http://localhost:8780", global = true)]
    pub url: String,

    #[command(subcommand)]
    pub command: SectionsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SectionsCommand {
    /// List all sections
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a section
    Add {
        /// Section title
        title: String,
        /// Optional icon name
        #[arg(long)]
        icon: Option<String>,
    },
    /// Remove a section by id
    Remove {
        /// Section id
        id: String,
    },
}

pub async fn execute(args: SectionsArgs) -> anyhow::Result<()> {
    let base = args.url.trim_end_matches('/').to_string();
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()?;

    match args.command {
        SectionsCommand::List { json } => {
            let resp = client
                .get(format!("{}/api/sections", base))
                .send()
                .await
                .map_err(|_| {
                    anyhow::anyhow!("Could not connect to {}. Is homeport running?", base)
                })?;
            if !resp.status().is_success() {
                anyhow::bail!("Sections endpoint returned {}", resp.status());
            }
            let data: serde_json::Value = resp.json().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                let empty = vec![];
                let sections = data.as_array().unwrap_or(&empty);
                if sections.is_empty() {
                    println!("No sections yet.");
                } else {
                    println!("Sections ({}):", sections.len());
                    for s in sections {
                        let title = s.get("title").and_then(|v| v.as_str()).unwrap_or("?");
                        let id = s.get("id").and_then(|v| v.as_str()).unwrap_or("?");
                        let links = s
                            .get("links")
                            .and_then(|v| v.as_array())
                            .map(|a| a.len())
                            .unwrap_or(0);
                        println!("  {} — {} link(s)  [{}]", title, links, id);
                    }
                }
            }
        }

        SectionsCommand::Add { title, icon } => {
            let resp = client
                .post(format!("{}/api/sections", base))
                .json(&serde_json::json!({ "title": title, "icon": icon }))
                .send()
                .await
                .map_err(|_| {
                    anyhow::anyhow!("Could not connect to {}. Is homeport running?", base)
                })?;
            if !resp.status().is_success() {
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("Failed to add section: {}", body);
            }
            let section: serde_json::Value = resp.json().await?;
            let id = section.get("id").and_then(|v| v.as_str()).unwrap_or("?");
            println!("✓ Added section \"{}\" [{}]", title, id);
        }

        SectionsCommand::Remove { id } => {
            let resp = client
                .delete(format!("{}/api/sections?id={}", base, id))
                .send()
                .await
                .map_err(|_| {
                    anyhow::anyhow!("Could not connect to {}. Is homeport running?", base)
                })?;
            if !resp.status().is_success() {
                let body = resp.text().await.unwrap_or_default();
                anyhow::bail!("Failed to remove section: {}", body);
            }
            println!("✓ Removed section {}", id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    #[derive(clap::Parser)]
    struct TestCli {
        #[command(subcommand)]
        cmd: super::SectionsCommand,
    }

    #[test]
    fn test_parse_list_command() {
        let cli = TestCli::try_parse_from(["sections", "list"]).unwrap();
        assert!(matches!(cli.cmd, super::SectionsCommand::List { json: false }));
    }

    #[test]
    fn test_parse_list_json() {
        let cli = TestCli::try_parse_from(["sections", "list", "--json"]).unwrap();
        assert!(matches!(cli.cmd, super::SectionsCommand::List { json: true }));
    }

    #[test]
    fn test_parse_add_with_icon() {
        let cli =
            TestCli::try_parse_from(["sections", "add", "Servers", "--icon", "server"]).unwrap();
        match cli.cmd {
            super::SectionsCommand::Add { title, icon } => {
                assert_eq!(title, "Servers");
                assert_eq!(icon.as_deref(), Some("server"));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_parse_remove_command() {
        let cli = TestCli::try_parse_from(["sections", "remove", "abc-123"]).unwrap();
        match cli.cmd {
            super::SectionsCommand::Remove { id } => assert_eq!(id, "abc-123"),
            _ => panic!("wrong variant"),
        }
    }
}
