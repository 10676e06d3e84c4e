use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "simnet", about = "In-process peer message relay")]
pub struct Opt {
    #[arg(
        long = "config",
        global = true,
        help = "TOML file with node settings (overrides environment)"
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        name = "simulate",
        about = "Connect peers, broadcast blocks and transactions, report what arrived"
    )]
    Simulate {
        #[arg(long, default_value_t = 3, help = "Number of peers to connect")]
        peers: usize,
        #[arg(long, default_value_t = 1, help = "Blocks to broadcast")]
        blocks: usize,
        #[arg(long, default_value_t = 1, help = "Transactions to broadcast")]
        transactions: usize,
    },
    #[command(
        name = "inject",
        about = "Deliver one message as if a peer had sent it"
    )]
    Inject {
        #[arg(help = "Sending peer id (need not be connected)")]
        peer: String,
        #[arg(help = "Message type, e.g. NEW_BLOCK or any custom tag")]
        message_type: String,
        #[arg(help = "Payload, taken as UTF-8 bytes")]
        data: String,
    },
    #[command(name = "showconfig", about = "Print the resolved node configuration")]
    ShowConfig,
}
