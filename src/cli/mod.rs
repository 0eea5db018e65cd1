use clap::{Parser, Subcommand};
use crate::tvm::{Address, Cell, base64_to_boc, boc_to_base64, deserialize_boc, hex_to_boc};
use crate::utils::method_name_to_id;
use crate::wallet::{
    InternalMessage, Order, SingleNominatorContract, SigningMessage, TransferArgs, WalletConfig,
};
use anyhow::{Context, Result, bail};
use ed25519_dalek::SigningKey;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// single-nominator wallet CLI
#[derive(Parser, Debug)]
#[command(name = "nominator-wallet")]
#[command(about = "Build signed single-nominator wallet messages", long_about = None)]
pub struct Cli {
    /// JSON file with wallet defaults (wallet_id, timeout_secs, workchain)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive the contract address for an owner and a validator
    Address {
        /// Owner address
        #[arg(short = 'o', long, allow_hyphen_values = true)]
        owner: String,
        /// Validator address
        #[arg(short = 'v', long, allow_hyphen_values = true)]
        validator: String,
        /// Contract code as a BoC file (binary, hex or base64)
        #[arg(long)]
        code: PathBuf,
        /// Workchain, overrides the config
        #[arg(short = 'w', long, allow_hyphen_values = true)]
        workchain: Option<i8>,
    },
    /// Build a transfer body
    Transfer {
        /// Current wallet seqno
        #[arg(short = 's', long)]
        seqno: u64,
        /// Send mode of the forwarded message
        #[arg(short = 'm', long, default_value = "3")]
        send_mode: u64,
        /// Wallet id, defaults to the config value
        #[arg(long)]
        wallet_id: Option<u64>,
        /// Expiry as unix time, defaults to now + timeout_secs
        #[arg(long)]
        timeout: Option<u64>,
        /// Hex-encoded 32-byte ed25519 secret key; omit for an unsigned probe
        #[arg(short = 'k', long)]
        secret_key: Option<String>,
        /// Destination of the forwarded message
        #[arg(long, allow_hyphen_values = true)]
        to: Option<String>,
        /// Amount in nanotons
        #[arg(long, default_value = "0")]
        amount: u128,
        /// Text comment attached to the forwarded message
        #[arg(long)]
        comment: Option<String>,
        /// Send the forwarded message as non-bounceable
        #[arg(long)]
        no_bounce: bool,
        /// Hex payload used as the order instead of an internal message
        #[arg(long, conflicts_with_all = ["to", "comment"])]
        raw_order: Option<String>,
    },
    /// Print the id of a get-method
    MethodId {
        name: String,
    },
}

/// Loads a cell from a BoC file stored as raw bytes, hex or base64
pub fn load_boc_file(path: &Path) -> Result<Arc<Cell>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    if let Ok(cell) = deserialize_boc(&bytes) {
        return Ok(cell);
    }

    let text = String::from_utf8(bytes).context("BoC file is neither binary nor text")?;
    let text = text.trim();
    if let Ok(cell) = hex_to_boc(text) {
        return Ok(cell);
    }
    base64_to_boc(text).with_context(|| format!("failed to parse BoC in {}", path.display()))
}

fn parse_secret_key(secret: &str) -> Result<SigningKey> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(secret.trim(), &mut bytes)
        .context("secret key must be 32 bytes of hex")?;
    Ok(SigningKey::from_bytes(&bytes))
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    fn load_config(&self) -> Result<WalletConfig> {
        match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Ok(WalletConfig::from_str(&json)?)
            }
            None => Ok(WalletConfig::default()),
        }
    }

    /// Execute the command
    pub fn execute(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.command {
            Commands::Address {
                owner,
                validator,
                code,
                workchain,
            } => self.execute_address(config, owner, validator, code, *workchain),
            Commands::Transfer {
                seqno,
                send_mode,
                wallet_id,
                timeout,
                secret_key,
                to,
                amount,
                comment,
                no_bounce,
                raw_order,
            } => {
                let order = build_order(
                    to.as_deref(),
                    *amount,
                    comment.as_deref(),
                    !*no_bounce,
                    raw_order.as_deref(),
                )?;
                let mut args = TransferArgs::new(*seqno, *send_mode, order);
                args.wallet_id = *wallet_id;
                args.timeout = *timeout;
                self.execute_transfer(config, args, secret_key.as_deref())
            }
            Commands::MethodId { name } => {
                println!("{}", method_name_to_id(name));
                Ok(())
            }
        }
    }

    fn execute_address(
        &self,
        mut config: WalletConfig,
        owner: &str,
        validator: &str,
        code: &Path,
        workchain: Option<i8>,
    ) -> Result<()> {
        if let Some(workchain) = workchain {
            config.workchain = workchain;
        }
        let owner = Address::from_str(owner).context("invalid owner address")?;
        let validator = Address::from_str(validator).context("invalid validator address")?;
        let code = load_boc_file(code)?;
        log::info!("Loaded code cell {}", hex::encode(code.hash()));

        let contract = SingleNominatorContract::create(&owner, &validator, code, config)?;
        let state_init = contract.state_init().to_cell()?;

        log::info!("Raw address: {}", contract.address().to_hex());
        log::info!("Bounceable: {}", contract.address().to_friendly(true, false, true));
        println!("{}", contract.address().to_hex());
        println!("{}", boc_to_base64(&state_init, true)?);
        Ok(())
    }

    fn execute_transfer(
        &self,
        config: WalletConfig,
        args: TransferArgs,
        secret_key: Option<&str>,
    ) -> Result<()> {
        let key = secret_key.map(parse_secret_key).transpose()?;
        let message: SigningMessage = args.into_signing_message(&config)?;
        let digest = message.signing_cell()?.hash();

        let body = match &key {
            Some(key) => message.sign(Some(key))?,
            None => {
                log::warn!("No secret key given, building an unsigned probe body");
                message.sign(None)?
            }
        };

        log::info!("Signing digest: {}", hex::encode(digest));
        log::info!("Body hash: {}", hex::encode(body.hash()));
        println!("{}", boc_to_base64(&body, true)?);
        Ok(())
    }
}

fn build_order(
    to: Option<&str>,
    amount: u128,
    comment: Option<&str>,
    bounce: bool,
    raw_order: Option<&str>,
) -> Result<Option<Order>> {
    if let Some(raw) = raw_order {
        let bytes = hex::decode(raw.trim()).context("raw order must be hex")?;
        return Ok(Some(Order::Raw(bytes)));
    }

    let Some(to) = to else {
        if comment.is_some() {
            bail!("--comment requires --to");
        }
        return Ok(None);
    };

    let dest = Address::from_str(to).context("invalid destination address")?;
    let mut message = InternalMessage::new(dest, amount, bounce);
    if let Some(text) = comment {
        message = message.with_body(InternalMessage::comment(text)?);
    }
    Ok(Some(Order::Internal(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transfer_command() {
        let cli = Cli::try_parse_from([
            "nominator-wallet",
            "transfer",
            "--seqno",
            "4",
            "--to",
            "0:3333333333333333333333333333333333333333333333333333333333333333",
            "--amount",
            "1000",
            "--comment",
            "hello",
        ])
        .unwrap();

        match cli.command {
            Commands::Transfer {
                seqno,
                send_mode,
                ref to,
                amount,
                ..
            } => {
                assert_eq!(seqno, 4);
                assert_eq!(send_mode, 3);
                assert!(to.is_some());
                assert_eq!(amount, 1000);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_raw_order_conflicts_with_destination() {
        let result = Cli::try_parse_from([
            "nominator-wallet",
            "transfer",
            "--seqno",
            "1",
            "--to",
            "0:3333333333333333333333333333333333333333333333333333333333333333",
            "--raw-order",
            "ff",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_order() {
        assert_eq!(build_order(None, 0, None, true, None).unwrap(), None);
        assert!(build_order(None, 0, Some("hi"), true, None).is_err());
        assert_eq!(
            build_order(None, 0, None, true, Some("abcd")).unwrap(),
            Some(Order::Raw(vec![0xAB, 0xCD]))
        );

        let order = build_order(
            Some("-1:3333333333333333333333333333333333333333333333333333333333333333"),
            5,
            Some("hi"),
            false,
            None,
        )
        .unwrap();
        match order {
            Some(Order::Internal(message)) => {
                assert_eq!(message.dest, Address::new(-1, [0x33; 32]));
                assert_eq!(message.value, 5);
                assert!(!message.bounce);
                assert!(message.body.is_some());
            }
            other => panic!("unexpected order {other:?}"),
        }
    }

    #[test]
    fn test_parse_secret_key() {
        assert!(parse_secret_key(&"07".repeat(32)).is_ok());
        assert!(parse_secret_key("07").is_err());
    }
}
