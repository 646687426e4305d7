//! Per-network builder and explorer tables

pub const MAINNET: u64 = 1;
pub const HOLESKY: u64 = 17000;
pub const SEPOLIA: u64 = 11155111;

/// Block builders accepting `eth_sendBundle` on mainnet
const MAINNET_BUILDERS: &[&str] = &[
    "flashbots",
    "f1b.io",
    "rsync",
    "beaverbuild.org",
    "builder0x69",
    "Titan",
    "EigenPhi",
    "boba-builder",
    "Gambit Labs",
    "payload",
    "Loki",
    "BuildAI",
    "JetBuilder",
    "tbuilder",
    "penguinbuild",
    "bobthebuilder",
    "BTCS",
    "bloXroute",
];

const TESTNET_BUILDERS: &[&str] = &["flashbots"];

pub fn known_builders(chain_id: u64) -> &'static [&'static str] {
    match chain_id {
        MAINNET => MAINNET_BUILDERS,
        _ => TESTNET_BUILDERS,
    }
}

/// Transaction page prefix of the canonical block explorer
pub fn explorer_tx_url(chain_id: u64) -> &'static str {
    match chain_id {
        HOLESKY => "https://holesky.etherscan.io/tx/",
        SEPOLIA => "https://sepolia.etherscan.io/tx/",
        _ => "https://etherscan.io/tx/",
    }
}
