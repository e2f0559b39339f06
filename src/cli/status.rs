//! `homeport status` — query a running server's status endpoint.

use clap::Args;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Server URL to query
    #[arg(long, default_value = "http://localhost:8780")]
    pub url: String,

    /// Output raw JSON instead of formatted
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: StatusArgs) -> anyhow::Result<()> {
    let status_url = format!("{}/api/status", args.url.trim_end_matches('/'));

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()?;

    let resp = client.get(&status_url).send().await.map_err(|_| {
        anyhow::anyhow!("Could not connect to {}. Is homeport running?", args.url)
    })?;

    if !resp.status().is_success() {
        anyhow::bail!("Status endpoint returned {}", resp.status());
    }

    let data: serde_json::Value = resp.json().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("Homeport Status");
        println!("{}", "=".repeat(40));

        if let Some(title) = data.get("title").and_then(|v| v.as_str()) {
            println!("Dashboard:    {}", title);
        }
        if let Some(version) = data.get("version").and_then(|v| v.as_str()) {
            println!("Version:      {}", version);
        }
        if let Some(uptime) = data.get("uptime_secs").and_then(|v| v.as_u64()) {
            println!("Uptime:       {}", format_uptime(uptime));
        }
        if let Some(sections) = data.get("sections").and_then(|v| v.as_u64()) {
            println!("Sections:     {}", sections);
        }
        if let Some(links) = data.get("links").and_then(|v| v.as_u64()) {
            println!("Links:        {}", links);
        }
        if let Some(widgets) = data.get("widgets").and_then(|v| v.as_u64()) {
            println!("Widgets:      {}", widgets);
        }
    }

    Ok(())
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m {}s", mins, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime_hours() {
        assert_eq!(format_uptime(7260), "2h 1m");
    }

    #[test]
    fn test_format_uptime_minutes() {
        assert_eq!(format_uptime(95), "1m 35s");
    }

    #[test]
    fn test_format_uptime_zero() {
        assert_eq!(format_uptime(0), "0m 0s");
    }
}
