//! Process configuration.
//!
//! Flags and their environment fallbacks are parsed by clap; [`DemoConfig`]
//! turns them into validated values once, at startup. Nothing else in the
//! binary reads the environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use momentx_api::{Identity, validate_endpoint};
use momentx_engine::{DEFAULT_GAS_BUDGET, Identities, WorkflowError, WorkflowSettings};
use url::Url;

/// Bytecode produced by `sui move build` for the demo package.
pub const DEFAULT_MODULE_PATH: &str = "packages/momentx/build/MomentX/bytecode_modules/ylabs_nft.mv";

/// Ledger endpoints, signing seeds and gas settings shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct LedgerArgs {
    /// Full node JSON-RPC endpoint.
    #[arg(long, env = "SUI_RPC_URL", global = true)]
    pub rpc_url: Option<String>,

    /// Faucet endpoint; identities are funded only when this is set.
    #[arg(long, env = "FAUCET_URL", global = true)]
    pub faucet_url: Option<String>,

    /// Hex Ed25519 seed (32 bytes) or key pair (64 bytes) of the admin.
    #[arg(long, env = "ADMIN_KEY_PAIR_SEED", hide_env_values = true, global = true)]
    pub admin_seed: Option<String>,

    #[arg(long, env = "MERCHANT_KEY_PAIR_SEED", hide_env_values = true, global = true)]
    pub merchant_seed: Option<String>,

    #[arg(long, env = "USER_KEY_PAIR_SEED", hide_env_values = true, global = true)]
    pub user_seed: Option<String>,

    /// Gas budget attached to every transaction.
    #[arg(long, env = "MOMENTX_GAS_BUDGET", default_value_t = DEFAULT_GAS_BUDGET, global = true)]
    pub gas_budget: u64,
}

/// Validated configuration for commands that talk to the ledger.
#[derive(Debug)]
pub struct DemoConfig {
    pub rpc_url: Url,
    pub faucet_url: Option<Url>,
    pub identities: Identities,
    pub gas_budget: u64,
}

impl DemoConfig {
    pub fn from_args(args: &LedgerArgs) -> Result<Self, WorkflowError> {
        let rpc_url = non_empty(args.rpc_url.as_deref()).ok_or_else(|| WorkflowError::configuration("SUI_RPC_URL", "not set"))?;
        let rpc_url = validate_endpoint(rpc_url).map_err(|error| WorkflowError::configuration("SUI_RPC_URL", error))?;

        let faucet_url = non_empty(args.faucet_url.as_deref())
            .map(|raw| validate_endpoint(raw).map_err(|error| WorkflowError::configuration("FAUCET_URL", error)))
            .transpose()?;

        let gas_budget = validate_gas_budget(args.gas_budget)?;
        let identities = load_identities(args)?;

        Ok(Self {
            rpc_url,
            faucet_url,
            identities,
            gas_budget,
        })
    }

    pub fn settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            gas_budget: self.gas_budget,
            ..WorkflowSettings::default()
        }
    }
}

/// Decode the three signing identities.
pub fn load_identities(args: &LedgerArgs) -> Result<Identities, WorkflowError> {
    Ok(Identities {
        admin: identity_from(args.admin_seed.as_deref(), "ADMIN_KEY_PAIR_SEED")?,
        merchant: identity_from(args.merchant_seed.as_deref(), "MERCHANT_KEY_PAIR_SEED")?,
        user: identity_from(args.user_seed.as_deref(), "USER_KEY_PAIR_SEED")?,
    })
}

pub fn validate_gas_budget(gas_budget: u64) -> Result<u64, WorkflowError> {
    if gas_budget == 0 {
        return Err(WorkflowError::configuration("MOMENTX_GAS_BUDGET", "must be greater than zero"));
    }
    Ok(gas_budget)
}

fn identity_from(seed: Option<&str>, field: &str) -> Result<Identity, WorkflowError> {
    let seed = non_empty(seed).ok_or_else(|| WorkflowError::configuration(field, "not set"))?;
    Identity::from_hex_seed(seed).map_err(|error| WorkflowError::configuration(field, error))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Read compiled module bytecode, one blob per path.
pub fn load_modules(paths: &[PathBuf]) -> Result<Vec<Vec<u8>>> {
    if paths.is_empty() {
        bail!("no module bytecode given");
    }
    paths.iter().map(|path| read_module(path)).collect()
}

fn read_module(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading module bytecode {}", path.display()))?;
    if bytes.is_empty() {
        bail!("module bytecode {} is empty", path.display());
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(byte: u8) -> String {
        format!("{byte:02x}").repeat(32)
    }

    fn complete_args() -> LedgerArgs {
        LedgerArgs {
            rpc_url: Some("https://fullnode.devnet.sui.io".into()),
            faucet_url: Some("http://127.0.0.1:9123".into()),
            admin_seed: Some(seed(7)),
            merchant_seed: Some(format!("0x{}", seed(8))),
            user_seed: Some(seed(9)),
            gas_budget: 2000,
        }
    }

    fn field_of(error: WorkflowError) -> String {
        match error {
            WorkflowError::Configuration { field, .. } => field,
            other => panic!("expected configuration error, got {other}"),
        }
    }

    #[test]
    fn complete_configuration_is_accepted() {
        let config = DemoConfig::from_args(&complete_args()).expect("valid config");
        assert_eq!(config.rpc_url.host_str(), Some("fullnode.devnet.sui.io"));
        assert_eq!(config.faucet_url.as_ref().and_then(|url| url.port()), Some(9123));
        assert_eq!(
            config.identities.admin.address().to_string(),
            "0xb433df8c8cf30ec783402ce3789e650cbfea088c"
        );
        assert_eq!(config.settings().gas_budget, 2000);
    }

    #[test]
    fn missing_seed_names_the_field() {
        let args = LedgerArgs {
            user_seed: None,
            ..complete_args()
        };
        assert_eq!(field_of(DemoConfig::from_args(&args).unwrap_err()), "USER_KEY_PAIR_SEED");
    }

    #[test]
    fn malformed_seed_names_the_field() {
        let args = LedgerArgs {
            merchant_seed: Some("not-hex".into()),
            ..complete_args()
        };
        assert_eq!(field_of(DemoConfig::from_args(&args).unwrap_err()), "MERCHANT_KEY_PAIR_SEED");
    }

    #[test]
    fn missing_or_insecure_endpoint_is_rejected() {
        let missing = LedgerArgs {
            rpc_url: None,
            ..complete_args()
        };
        assert_eq!(field_of(DemoConfig::from_args(&missing).unwrap_err()), "SUI_RPC_URL");

        let insecure = LedgerArgs {
            faucet_url: Some("http://faucet.example.com".into()),
            ..complete_args()
        };
        assert_eq!(field_of(DemoConfig::from_args(&insecure).unwrap_err()), "FAUCET_URL");
    }

    #[test]
    fn blank_faucet_disables_funding() {
        let args = LedgerArgs {
            faucet_url: Some("  ".into()),
            ..complete_args()
        };
        assert!(DemoConfig::from_args(&args).unwrap().faucet_url.is_none());
    }

    #[test]
    fn zero_gas_budget_is_rejected() {
        let args = LedgerArgs {
            gas_budget: 0,
            ..complete_args()
        };
        assert_eq!(field_of(DemoConfig::from_args(&args).unwrap_err()), "MOMENTX_GAS_BUDGET");
    }

    #[test]
    fn modules_are_read_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.mv");
        let second = dir.path().join("b.mv");
        std::fs::write(&first, [0xa1u8, 0x1c, 0xeb]).unwrap();
        std::fs::write(&second, [0x0bu8]).unwrap();

        let modules = load_modules(&[first, second]).unwrap();
        assert_eq!(modules, vec![vec![0xa1, 0x1c, 0xeb], vec![0x0b]]);
    }

    #[test]
    fn missing_or_empty_module_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.mv");
        let error = load_modules(std::slice::from_ref(&missing)).unwrap_err();
        assert!(format!("{error:#}").contains("missing.mv"));

        let empty = dir.path().join("empty.mv");
        std::fs::write(&empty, b"").unwrap();
        assert!(load_modules(&[empty]).is_err());
        assert!(load_modules(&[]).is_err());
    }
}
