use anyhow::Result;
use clap::{Parser, Subcommand};

use comm_bench::config::Role;
use comm_bench::event::WireFormat;
use comm_bench::logging;
use comm_bench::roles::consumer::{ConsumerConfig, run_consumer};
use comm_bench::roles::generator::{GeneratorConfig, run_generator};

#[derive(Parser)]
#[command(name = "comm-bench")]
#[command(about = "Broker test harness: synthetic telemetry over MQTT, read back from Kafka")]
struct Cli {
    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Snapshot interval in seconds for periodic consumer stats output
    #[arg(long, default_value = "30")]
    snapshot_interval: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Event generator, agent role
    Agent {
        /// MQTT broker host
        #[arg(long, default_value = "localhost")]
        host: String,

        /// MQTT broker port
        #[arg(long, default_value = "1883")]
        port: u16,

        /// Wire encoding for published events
        #[arg(long, value_enum, default_value_t = WireFormat::Json)]
        format: WireFormat,
    },
    /// Event generator, producer role
    Producer {
        /// MQTT broker host
        #[arg(long, default_value = "localhost")]
        host: String,

        /// MQTT broker port
        #[arg(long, default_value = "1883")]
        port: u16,

        /// Wire encoding for published events
        #[arg(long, value_enum, default_value_t = WireFormat::Json)]
        format: WireFormat,
    },
    /// Kafka event consumer
    Consumer {
        /// Topic name
        #[arg(short = 't', long)]
        topic: String,

        /// Consumer group identifier; a random group is generated when omitted
        #[arg(short = 'g', long)]
        group: Option<String>,

        /// Kafka bootstrap servers
        #[arg(long, default_value = "localhost:9092")]
        brokers: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level)?;

    match cli.command {
        Commands::Agent { host, port, format } => {
            run_generator(GeneratorConfig {
                role: Role::Agent,
                host,
                port,
                format,
            })
            .await
        }
        Commands::Producer { host, port, format } => {
            run_generator(GeneratorConfig {
                role: Role::Producer,
                host,
                port,
                format,
            })
            .await
        }
        Commands::Consumer {
            topic,
            group,
            brokers,
        } => {
            run_consumer(ConsumerConfig {
                topic,
                group,
                brokers,
                snapshot_interval_secs: cli.snapshot_interval,
            })
            .await
        }
    }
}
