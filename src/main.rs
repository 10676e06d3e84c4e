// Entry point for the simnet binary: drives a NetworkNode from the command line
use clap::Parser;
use log::{error, info};
use serde::Serialize;
use simnet_relay::network::ReceptionChannel;
use simnet_relay::{
    sha256_digest, Block, BroadcastResult, Command, DispatchOutcome, MessageHandler,
    NetworkConfig, NetworkNode, Opt, TXInput, TXOutput, Transaction,
};
use std::process;
use std::sync::Arc;
use std::time::Duration;

// how long the reception channels must stay quiet before a simulation is reported
const SETTLE_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Debug, Default, Serialize)]
struct SimulationReport {
    node_id: String,
    peers: usize,
    blocks_broadcast: usize,
    transactions_broadcast: usize,
    mailbox_deliveries: BroadcastResult,
    blocks_received: usize,
    blocks_decoded: usize,
    transactions_received: usize,
    transactions_decoded: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load_config(opt: &Opt) -> simnet_relay::Result<NetworkConfig> {
    match &opt.config {
        Some(path) => NetworkConfig::from_file(path),
        None => NetworkConfig::from_env(),
    }
}

fn run_command(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&opt)?;
    match opt.command {
        Command::Simulate {
            peers,
            blocks,
            transactions,
        } => {
            let report = simulate(config, peers, blocks, transactions)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Inject {
            peer,
            message_type,
            data,
        } => {
            let node = NetworkNode::with_config(config)?;
            let handler: MessageHandler = Arc::new(|peer_id: &str, message_type: &str, data: &[u8]| {
                info!(
                    "Handler got '{message_type}' from [{peer_id}]: {}",
                    String::from_utf8_lossy(data)
                );
            });
            node.register_message_handler(Some(handler));

            let outcome = node.simulate_receive(&peer, &message_type, data.into_bytes());
            println!("{outcome:?}");
            if outcome == DispatchOutcome::Queued {
                let queued = node
                    .block_reception_channel()
                    .try_recv()
                    .or_else(|| node.transaction_reception_channel().try_recv());
                if let Some(bytes) = queued {
                    println!("queued {} bytes", bytes.len());
                }
            }
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml()?);
        }
    }
    Ok(())
}

fn simulate(
    config: NetworkConfig,
    peers: usize,
    blocks: usize,
    transactions: usize,
) -> simnet_relay::Result<SimulationReport> {
    let node = NetworkNode::with_config(config)?;
    for i in 0..peers {
        node.connect_peer(&format!("peer-{i}"))?;
    }

    let mut report = SimulationReport {
        node_id: node.node_id().to_string(),
        peers: node.peer_count(),
        ..Default::default()
    };

    let mut prev_hash = sha256_digest(b"genesis");
    for height in 0..blocks {
        let tx = sample_transaction(height)?;
        let block = Block::new_block(height as i64 + 1, &prev_hash, &[tx])?;
        prev_hash = block.get_hash().to_vec();
        accumulate(&mut report.mailbox_deliveries, node.broadcast_block(&block));
        report.blocks_broadcast += 1;
    }
    for i in 0..transactions {
        let tx = sample_transaction(i)?;
        accumulate(&mut report.mailbox_deliveries, node.broadcast_transaction(&tx));
        report.transactions_broadcast += 1;
    }

    let (received, decoded) = collect(node.block_reception_channel(), |bytes| {
        Block::deserialize(bytes).is_ok()
    });
    report.blocks_received = received;
    report.blocks_decoded = decoded;

    let (received, decoded) = collect(node.transaction_reception_channel(), |bytes| {
        Transaction::deserialize(bytes).is_ok()
    });
    report.transactions_received = received;
    report.transactions_decoded = decoded;

    node.shutdown();
    Ok(report)
}

fn sample_transaction(seed: usize) -> simnet_relay::Result<Transaction> {
    let prev = sha256_digest(format!("coin-{seed}").as_bytes());
    let output = TXOutput::new(1 + seed as u64, &sha256_digest(b"recipient"))?;
    Transaction::new_standard(vec![TXInput::new(&prev, 0)], vec![output], 1)
}

fn accumulate(total: &mut BroadcastResult, result: BroadcastResult) {
    total.sent += result.sent;
    total.dropped += result.dropped;
}

fn collect<F: Fn(&[u8]) -> bool>(channel: &ReceptionChannel, decodes: F) -> (usize, usize) {
    let mut received = 0;
    let mut decoded = 0;
    while let Some(bytes) = channel.recv_timeout(SETTLE_TIMEOUT) {
        received += 1;
        if decodes(&bytes) {
            decoded += 1;
        }
    }
    (received, decoded)
}
