mod doctor;
mod serve;

use anyhow::Result;
use console::style;

use crate::core::config::DEFAULT_PORT;
use crate::core::terminal::{self, print_error};

fn print_help() {
    terminal::print_banner();

    println!(" {}", style("Commands").bold());
    println!(
        "   {}   Start the API server",
        style("serve ").green().bold()
    );
    println!(
        "   {}   Check environment keys and server health",
        style("doctor").green().bold()
    );
    println!(
        "   {}   Show this help message",
        style("help  ").green().bold()
    );
    println!();
    println!(" {}", style("Flags for serve").bold());
    println!("   --host <addr>   Bind address (default 127.0.0.1)");
    println!("   --port <port>   Listen port (default {})", DEFAULT_PORT);
    println!(
        "\n {} {} <command> [flags]\n",
        style("Usage:").bold(),
        style("fudai").green()
    );
}

pub(crate) fn parse_serve_flags(
    args: &[String],
    start: usize,
    mut host: String,
    mut port: u16,
) -> (String, u16) {
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                if i + 1 < args.len() {
                    // An unparsable value keeps whatever the env resolved to.
                    port = args[i + 1].parse().unwrap_or(port);
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--host" => {
                if i + 1 < args.len() {
                    host = args[i + 1].clone();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    (host, port)
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() <= 1 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "serve" => serve::run_serve(&args).await,
        "doctor" => doctor::run_doctor().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        cmd => {
            print_error(&format!("Unknown command: {}", cmd));
            print_help();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_serve_flags;

    #[test]
    fn parse_serve_flags_reads_host_and_port() {
        let args = vec![
            "fudai".to_string(),
            "serve".to_string(),
            "--host".to_string(),
            "0.0.0.0".to_string(),
            "--port".to_string(),
            "8080".to_string(),
        ];
        let (host, port) = parse_serve_flags(&args, 2, "127.0.0.1".to_string(), 3002);
        assert_eq!(host, "0.0.0.0");
        assert_eq!(port, 8080);
    }

    #[test]
    fn parse_serve_flags_keeps_defaults_without_flags() {
        let args = vec!["fudai".to_string(), "serve".to_string()];
        let (host, port) = parse_serve_flags(&args, 2, "127.0.0.1".to_string(), 3002);
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, 3002);
    }

    #[test]
    fn bad_port_flag_keeps_the_incoming_default() {
        let args = vec![
            "fudai".to_string(),
            "serve".to_string(),
            "--port".to_string(),
            "notaport".to_string(),
        ];
        // 4321 stands in for a value already resolved from the env.
        let (_, port) = parse_serve_flags(&args, 2, "127.0.0.1".to_string(), 4321);
        assert_eq!(port, 4321);
    }
}
