use anyhow::Result;
use std::time::Duration;

use crate::core::config::{DASHSCOPE_KEY_CANDIDATES, ServerConfig, normalize_env_value};
use crate::core::terminal::{print_error, print_info, print_step, print_success, print_warn};

/// Show only enough of a key to recognize it. Counts chars, not bytes, so
/// pasted multi-byte values cannot split a char boundary.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

fn check_env_key(label: &str, candidates: &[&str]) -> bool {
    for name in candidates {
        if let Ok(raw) = std::env::var(name) {
            let value = normalize_env_value(&raw);
            if !value.is_empty() {
                print_success(&format!("{}: {} = {}", label, name, mask_key(&value)));
                return true;
            }
        }
    }
    print_warn(&format!("{}: not set ({})", label, candidates.join(" / ")));
    false
}

pub async fn run_doctor() -> Result<()> {
    dotenvy::dotenv().ok();

    print_step("Checking vendor API keys...");
    println!();
    check_env_key("Fish Audio", &["FISH_AUDIO_API_KEY"]);
    check_env_key("DashScope", DASHSCOPE_KEY_CANDIDATES);
    check_env_key("LiblibAI access", &["LIBLIB_ACCESS_KEY"]);
    check_env_key("LiblibAI secret", &["LIBLIB_SECRET_KEY"]);

    println!();
    print_step("Checking runtime configuration...");
    println!();
    let config = ServerConfig::from_env();
    let report = config.report();
    for warning in &report.soft_warnings {
        print_warn(warning);
    }
    for error in &report.hard_errors {
        if config.production {
            print_error(error);
        } else {
            print_warn(error);
        }
    }
    if report.hard_errors.is_empty() && report.soft_warnings.is_empty() {
        print_success("All features enabled.");
    } else if !config.production {
        print_info("Development mode: missing keys only disable their features.");
    }

    println!();
    print_step("Probing local API server...");
    println!();
    let url = format!("http://{}:{}/api/health", config.host, config.port);
    let client = reqwest::Client::new();
    match client
        .get(&url)
        .timeout(Duration::from_secs(3))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            print_success(&format!("Server is up at {}", url));
            if let Ok(body) = resp.json::<serde_json::Value>().await {
                let features = &body["features"];
                print_info(&format!(
                    "Features: voice={} image={} vision={}",
                    features["voice"], features["image"], features["vision"]
                ));
            }
        }
        Ok(resp) => {
            print_warn(&format!("Server responded with status {}", resp.status()));
        }
        Err(_) => {
            print_warn(&format!(
                "No server at {} (start one with 'fudai serve')",
                url
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::mask_key;

    #[test]
    fn mask_key_hides_the_middle() {
        assert_eq!(mask_key("sk-1234567890abcdef"), "sk-1...cdef");
        assert_eq!(mask_key("short"), "****");
    }

    #[test]
    fn mask_key_handles_multi_byte_chars() {
        assert_eq!(mask_key("密钥密"), "****");
        assert_eq!(mask_key("密钥密钥密钥密钥密"), "密钥密钥...钥密钥密");
    }
}
