use clap::Parser;

/// Telemetry intake settings. Every flag can also be set through its environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "telemetry", about = "Telemetry intake service", version)]
pub struct Config {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5001)]
    pub port: u16,
}

impl Config {
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
